use byteorder::LittleEndian;

use crate::io::Buf;
use crate::protocol::auth::AuthPlugin;
use crate::protocol::capabilities::Capabilities;
use crate::protocol::status::Status;

/// The initial handshake packet (protocol version 10) sent by the server as soon as
/// the connection opens.
///
/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_v10.html
/// https://mariadb.com/kb/en/connection/#initial-handshake-packet
#[derive(Debug)]
pub(crate) struct Handshake {
    pub(crate) protocol_version: u8,
    pub(crate) server_version: Box<str>,
    pub(crate) connection_id: u32,
    pub(crate) server_capabilities: Capabilities,
    pub(crate) server_default_collation: u8,
    pub(crate) status: Status,
    pub(crate) auth_plugin: AuthPlugin,
    pub(crate) auth_plugin_data: Box<[u8]>,
}

impl Handshake {
    pub(crate) fn read(mut buf: &[u8]) -> crate::Result<Self> {
        let protocol_version = buf.get_u8()?;
        if protocol_version != 10 {
            return Err(protocol_err!(
                "unsupported handshake protocol version: {}",
                protocol_version
            )
            .into());
        }

        let server_version = buf.get_str_nul()?.into();
        let connection_id = buf.get_u32::<LittleEndian>()?;

        let mut scramble = Vec::with_capacity(20);
        scramble.extend_from_slice(buf.get_bytes(8)?);

        // filler
        buf.advance(1);

        let capabilities_lo = buf.get_u16::<LittleEndian>()?;
        let mut capabilities = Capabilities::from_bits_truncate(capabilities_lo as u64);

        let char_set = buf.get_u8()?;
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);

        let capabilities_hi = buf.get_u16::<LittleEndian>()?;
        capabilities |= Capabilities::from_bits_truncate((capabilities_hi as u64) << 16);

        let auth_plugin_data_len = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.get_u8()?
        } else {
            buf.advance(1);
            0
        };

        // reserved
        buf.advance(10);

        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            // length = MAX(13, auth_plugin_data_len - 8), minus the reserved byte below
            let len = ((auth_plugin_data_len as isize) - 9).max(12) as usize;
            scramble.extend_from_slice(buf.get_bytes(len)?);

            // reserved
            buf.advance(1);
        }

        let auth_plugin = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            AuthPlugin::from_name(buf.get_str_nul()?)?
        } else {
            AuthPlugin::MySqlNativePassword
        };

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            server_capabilities: capabilities,
            server_default_collation: char_set,
            status,
            auth_plugin,
            auth_plugin_data: scramble.into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDSHAKE_MARIADB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";

    #[test]
    fn it_reads_mariadb_handshake() {
        let p = Handshake::read(HANDSHAKE_MARIADB_10_4_7).unwrap();

        assert_eq!(p.protocol_version, 10);
        assert_eq!(
            &*p.server_version,
            "5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic"
        );
        assert_eq!(p.connection_id, 11);
        assert!(p.server_capabilities.contains(Capabilities::PROTOCOL_41));
        assert!(p
            .server_capabilities
            .contains(Capabilities::SECURE_CONNECTION));
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert_eq!(p.auth_plugin, AuthPlugin::MySqlNativePassword);
        assert_eq!(p.auth_plugin_data.len(), 20);
    }
}
