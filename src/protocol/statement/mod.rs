mod close;
mod execute;
mod long_data;
mod prepare;
mod prepare_ok;

pub(crate) use close::ComStmtClose;
pub(crate) use execute::{ComStmtExecute, Cursor};
pub(crate) use long_data::ComStmtSendLongData;
pub(crate) use prepare::ComStmtPrepare;
pub(crate) use prepare_ok::ComStmtPrepareOk;
