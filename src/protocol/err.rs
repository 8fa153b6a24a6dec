use crate::error::MySqlError;
use crate::io::Buf;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_basic_err_packet.html
/// https://mariadb.com/kb/en/err_packet/
pub(crate) fn read_err_packet(mut buf: &[u8]) -> crate::Result<MySqlError> {
    let header = buf.get_u8()?;
    if header != 0xFF {
        return Err(protocol_err!("expected 0xFF; received 0x{:X}", header).into());
    }

    let error_code = buf.get_u16::<byteorder::LittleEndian>()?;

    // sql_state_marker ('#') then the 5-character SQL state
    let _marker = buf.get_u8()?;
    let sql_state = buf.get_str(5)?.into();

    let message = buf.get_str(buf.len())?.into();

    Ok(MySqlError {
        error_code,
        sql_state,
        message,
    })
}
