use byteorder::LittleEndian;

use crate::io::Buf;
use crate::protocol::status::Status;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_basic_eof_packet.html
/// https://mariadb.com/kb/en/eof_packet/
///
/// Only sent when `Capabilities::DEPRECATE_EOF` was not negotiated; modern servers
/// replace this with a final OK packet instead.
#[derive(Debug)]
pub(crate) struct EofPacket {
    pub(crate) warnings: u16,
    pub(crate) status: Status,
}

impl EofPacket {
    pub(crate) fn read(mut buf: &[u8]) -> crate::Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFE {
            return Err(protocol_err!("expected EOF (0xFE); received 0x{:X}", header).into());
        }

        let warnings = buf.get_u16::<LittleEndian>()?;
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);

        Ok(Self { warnings, status })
    }

    /// True for any packet shaped like an EOF/OK marker under five bytes — the prefix
    /// every row-result terminator shares, whether or not `DEPRECATE_EOF` is set.
    pub(crate) fn looks_like_eof(packet: &[u8]) -> bool {
        packet.first() == Some(&0xFE) && packet.len() < 9
    }
}
