//! Wire-level packet types: nothing in this module touches a socket. Encoding produces
//! a `Vec<u8>` packet body; decoding consumes an already-framed payload (see
//! [`crate::packet`] for the 4-byte header framing and sequence-number discipline).

pub(crate) mod auth;
pub(crate) mod capabilities;
pub(crate) mod column_def;
pub(crate) mod column_type;
pub(crate) mod commands;
pub(crate) mod eof;
pub(crate) mod err;
pub(crate) mod handshake;
pub(crate) mod handshake_response;
pub(crate) mod ok;
pub(crate) mod row;
pub(crate) mod status;
pub(crate) mod statement;

pub use column_def::ColumnDefinition;
pub use column_type::{ColumnType, FieldFlags};
pub use commands::RefreshFlags;
pub use status::Status;

pub(crate) use capabilities::{Capabilities, CLIENT_CAPABILITIES};
