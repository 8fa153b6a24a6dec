use crate::io::BufMut;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_query.html
#[derive(Debug)]
pub(crate) struct ComQuery<'a> {
    pub(crate) query: &'a str,
}

impl ComQuery<'_> {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x03);
        buf.put_str(self.query);
    }
}

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_ping.html
#[derive(Debug)]
pub(crate) struct ComPing;

impl ComPing {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x0e);
    }
}

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_init_db.html
#[derive(Debug)]
pub(crate) struct ComInitDb<'a> {
    pub(crate) schema: &'a str,
}

impl ComInitDb<'_> {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x02);
        buf.put_str(self.schema);
    }
}

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_quit.html
#[derive(Debug)]
pub(crate) struct ComQuit;

impl ComQuit {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x01);
    }
}

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_statistics.html
#[derive(Debug)]
pub(crate) struct ComStatistics;

impl ComStatistics {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x09);
    }
}

bitflags::bitflags! {
    /// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_refresh.html
    pub struct RefreshFlags: u8 {
        const GRANT = 0x01;
        const LOG = 0x02;
        const TABLES = 0x04;
        const HOSTS = 0x08;
        const STATUS = 0x10;
        const THREADS = 0x20;
        const SLAVE = 0x40;
    }
}

#[derive(Debug)]
pub(crate) struct ComRefresh {
    pub(crate) flags: RefreshFlags,
}

impl ComRefresh {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x07);
        buf.put_u8(self.flags.bits());
    }
}

#[derive(Debug, Copy, Clone)]
#[repr(u16)]
pub(crate) enum SetOption {
    MultiStatementsOn = 0x00,
    MultiStatementsOff = 0x01,
}

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_set_option.html
///
/// The server's reply is a 5-byte packet shaped exactly like an EOF packet (0xFE
/// header, 2 bytes warnings, 2 bytes status) rather than an OK packet; callers should
/// decode it with [`super::eof::EofPacket::read`].
#[derive(Debug)]
pub(crate) struct ComSetOption {
    pub(crate) option: SetOption,
}

impl ComSetOption {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x1b);
        buf.put_u16::<byteorder::LittleEndian>(self.option as u16);
    }
}
