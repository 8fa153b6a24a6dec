mod buf;
mod buf_mut;

pub(crate) use buf::{Buf, LenEnc, LenEncStr};
pub(crate) use buf_mut::BufMut;
