use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::protocol::auth::AuthPlugin;
use crate::protocol::capabilities::Capabilities;

/// The client's reply to the server [`super::handshake::Handshake`].
///
/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_response.html
/// https://mariadb.com/kb/en/connection/#handshake-response-packet
#[derive(Debug)]
pub(crate) struct HandshakeResponse<'a> {
    pub(crate) client_capabilities: Capabilities,
    pub(crate) max_packet_size: u32,
    pub(crate) client_collation: u8,
    pub(crate) username: &'a str,
    pub(crate) database: Option<&'a str>,
    pub(crate) auth_plugin: AuthPlugin,
    pub(crate) auth_response: &'a [u8],
}

impl HandshakeResponse<'_> {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u32::<LittleEndian>(self.client_capabilities.bits() as u32);
        buf.put_u32::<LittleEndian>(self.max_packet_size);
        buf.put_u8(self.client_collation);

        // reserved
        buf.extend(std::iter::repeat(0u8).take(19));
        buf.put_u32::<LittleEndian>((self.client_capabilities.bits() >> 32) as u32);

        buf.put_str_nul(self.username);

        if self
            .client_capabilities
            .contains(Capabilities::PLUGIN_AUTH_LENENC_DATA)
        {
            buf.put_bytes_lenenc::<LittleEndian>(self.auth_response);
        } else {
            buf.put_u8(self.auth_response.len() as u8);
            buf.put_bytes(self.auth_response);
        }

        if self.client_capabilities.contains(Capabilities::CONNECT_WITH_DB) {
            if let Some(database) = self.database {
                buf.put_str_nul(database);
            }
        }

        if self.client_capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.put_str_nul(self.auth_plugin.name());
        }
    }
}
