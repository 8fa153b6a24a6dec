use byteorder::LittleEndian;

use crate::io::BufMut;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_stmt_close.html
///
/// Sent when a prepared-statement handle's last owner drops it. The server sends no
/// reply to this command.
#[derive(Debug)]
pub(crate) struct ComStmtClose {
    pub(crate) statement_id: u32,
}

impl ComStmtClose {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x19);
        buf.put_u32::<LittleEndian>(self.statement_id);
    }
}
