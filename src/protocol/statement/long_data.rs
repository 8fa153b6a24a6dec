use byteorder::LittleEndian;

use crate::io::BufMut;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_stmt_send_long_data.html
///
/// Sends one chunk of a parameter's value out of band, ahead of COM_STMT_EXECUTE. The
/// server appends each chunk to that parameter's buffer and accumulates across
/// multiple sends; no reply is sent.
#[derive(Debug)]
pub(crate) struct ComStmtSendLongData<'a> {
    pub(crate) statement_id: u32,
    pub(crate) param_index: u16,
    pub(crate) chunk: &'a [u8],
}

impl ComStmtSendLongData<'_> {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x18);
        buf.put_u32::<LittleEndian>(self.statement_id);
        buf.put_u16::<LittleEndian>(self.param_index);
        buf.put_bytes(self.chunk);
    }
}
