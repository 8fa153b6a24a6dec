use byteorder::LittleEndian;

use crate::io::Buf;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_stmt_prepare.html#sect_protocol_com_stmt_prepare_response_ok
#[derive(Debug)]
pub(crate) struct ComStmtPrepareOk {
    pub(crate) statement_id: u32,
    /// Number of columns in the result set, or 0 if the statement returns none.
    pub(crate) columns: u16,
    /// Number of `?` placeholders.
    pub(crate) params: u16,
    pub(crate) warnings: u16,
}

impl ComStmtPrepareOk {
    pub(crate) fn read(mut buf: &[u8]) -> crate::Result<Self> {
        let header = buf.get_u8()?;
        if header != 0x00 {
            return Err(protocol_err!(
                "expected COM_STMT_PREPARE_OK (0x00); received 0x{:X}",
                header
            )
            .into());
        }

        let statement_id = buf.get_u32::<LittleEndian>()?;
        let columns = buf.get_u16::<LittleEndian>()?;
        let params = buf.get_u16::<LittleEndian>()?;

        // filler
        buf.advance(1);

        let warnings = buf.get_u16::<LittleEndian>()?;

        Ok(Self {
            statement_id,
            columns,
            params,
            warnings,
        })
    }
}
