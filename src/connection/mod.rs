//! The client connection: handshake, authentication, and the command API built on top
//! of the packet stream.

pub mod ingest;
pub mod prepared;
pub mod result;

use log::{debug, trace};

use crate::error::Error;
use crate::options::ConnectOptions;
use crate::packet::PacketStream;
use crate::pool::Poolable;
use crate::protocol::auth::AuthPlugin;
use crate::protocol::capabilities::{Capabilities, CLIENT_CAPABILITIES};
use crate::protocol::commands::{
    ComInitDb, ComPing, ComQuery, ComQuit, ComRefresh, ComSetOption, ComStatistics, RefreshFlags, SetOption,
};
use crate::protocol::eof::EofPacket;
use crate::protocol::err::read_err_packet;
use crate::protocol::handshake::Handshake;
use crate::protocol::handshake_response::HandshakeResponse;
use crate::protocol::ok::OkPacket;
use crate::protocol::status::Status;
use crate::transport::{TcpTransport, Transport};

pub use prepared::PreparedStatement;
pub use result::{ResultSet, ResultStream};

/// Matches the teacher driver's conservative default; this connection never sends a
/// payload anywhere near this size in practice (no `LOCAL INFILE` support).
const MAX_PACKET_SIZE: u32 = 1024;

/// `utf8mb4_unicode_ci`, requested so string columns round-trip as UTF-8 without a
/// session-level `SET NAMES`.
const CLIENT_COLLATION_UTF8MB4: u8 = 224;

/// A connection to a MySQL or MariaDB server, generic over its [`Transport`].
///
/// Every command method borrows `&mut self`: the wire protocol is strictly
/// request/response, so there is never more than one command outstanding. Methods that
/// produce a result set ([`Self::query`], [`PreparedStatement::query`]) return a cursor
/// borrowing the connection for as long as rows remain unread; dropping the cursor
/// without reading to the end drains the rest for you.
pub struct Connection<T: Transport> {
    pub(crate) packets: PacketStream<T>,
    capabilities: Capabilities,
    server_version: Box<str>,
    connection_id: u32,
    status: Status,
    pub(crate) rows_pending: bool,
    pub(crate) binary_pending: bool,
    last_insert_id: u64,
    options: ConnectOptions,
}

/// The only transport this driver connects over in practice.
pub type MySqlConnection = Connection<TcpTransport>;

impl<T: Transport> Connection<T> {
    pub(crate) fn with_transport(transport: T, options: ConnectOptions) -> crate::Result<Self> {
        let mut packets = PacketStream::new(transport);

        let greeting = packets.receive()?;
        if greeting.first() == Some(&0xFF) {
            return Err(Error::Auth(read_err_packet(greeting)?.message));
        }
        let handshake = Handshake::read(greeting)?;
        trace!(
            "received handshake from server {} (connection id {})",
            handshake.server_version,
            handshake.connection_id
        );

        if !handshake.server_capabilities.contains(Capabilities::PROTOCOL_41)
            || !handshake.server_capabilities.contains(Capabilities::SECURE_CONNECTION)
        {
            return Err(Error::Auth(
                "server does not support the 4.1 protocol handshake".into(),
            ));
        }

        let mut client_capabilities = CLIENT_CAPABILITIES & handshake.server_capabilities;
        client_capabilities |= Capabilities::PROTOCOL_41 | Capabilities::SECURE_CONNECTION;
        if options.database.is_none() {
            client_capabilities.remove(Capabilities::CONNECT_WITH_DB);
        }

        let auth_response = if options.password.is_empty() {
            Vec::new()
        } else {
            handshake
                .auth_plugin
                .scramble(&options.password, &handshake.auth_plugin_data)?
        };

        trace!("negotiated capabilities {:?}", client_capabilities);

        // The handshake response continues the same packet exchange the greeting
        // opened (sequence 1, not a fresh command at sequence 0).
        let mut buf = Vec::new();
        HandshakeResponse {
            client_capabilities,
            max_packet_size: MAX_PACKET_SIZE,
            client_collation: CLIENT_COLLATION_UTF8MB4,
            username: &options.user,
            database: options.database.as_deref(),
            auth_plugin: handshake.auth_plugin,
            auth_response: &auth_response,
        }
        .encode(&mut buf);
        packets.send(&buf)?;
        trace!("sent handshake response for user {}", options.user);

        let reply = packets.receive()?;
        let status = match reply.first().copied() {
            Some(0x00) => OkPacket::read(reply)?.status,
            Some(0xFF) => return Err(Error::Auth(read_err_packet(reply)?.message)),
            other => {
                return Err(protocol_err!("expected login OK or ERR packet; received {:?}", other).into())
            }
        };
        debug!("authenticated as {} (connection id {})", options.user, handshake.connection_id);

        Ok(Self {
            packets,
            capabilities: client_capabilities,
            server_version: handshake.server_version,
            connection_id: handshake.connection_id,
            status,
            rows_pending: false,
            binary_pending: false,
            last_insert_id: 0,
            options,
        })
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.rows_pending
    }

    fn ensure_not_pending(&self) -> crate::Result<()> {
        if self.has_pending() {
            Err(Error::DataPending)
        } else {
            Ok(())
        }
    }

    /// Closes the transport without sending `COM_QUIT`. Used when the connection has
    /// already violated the protocol and can't be trusted to exchange another packet.
    pub fn kill(&mut self) {
        debug!("kill() called (connection id {})", self.connection_id);
        self.packets.poison();
    }

    /// Runs a statement expected to produce no rows, returning the affected-row count.
    /// Fails with [`Error::ResultReceived`] (after draining the spurious rows) if the
    /// statement returned a result set.
    pub fn exec(&mut self, sql: &str) -> crate::Result<u64> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_QUERY (exec): {}", sql);

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComQuery { query: sql }.encode(&mut buf);
        self.packets.send(&buf)?;

        match ingest::dispatch(&mut self.packets)? {
            ingest::CommandOutcome::Ok {
                affected_rows,
                last_insert_id,
            } => {
                self.last_insert_id = last_insert_id;
                Ok(affected_rows)
            }
            ingest::CommandOutcome::ResultSet { columns, .. } => {
                let _ = ingest::purge(&mut self.packets, &columns, false)?;
                Err(Error::ResultReceived)
            }
        }
    }

    /// Runs a statement expected to produce a result set, returning a cursor over it.
    /// Fails with [`Error::NoResultReceived`] if the statement returned none.
    pub fn query(&mut self, sql: &str) -> crate::Result<ResultStream<'_, T>> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_QUERY (query): {}", sql);

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComQuery { query: sql }.encode(&mut buf);
        self.packets.send(&buf)?;

        match ingest::dispatch(&mut self.packets)? {
            ingest::CommandOutcome::ResultSet { columns, .. } => {
                self.rows_pending = true;
                self.binary_pending = false;
                Ok(ResultStream::new(self, columns, false))
            }
            ingest::CommandOutcome::Ok { .. } => Err(Error::NoResultReceived),
        }
    }

    pub fn select_db(&mut self, schema: &str) -> crate::Result<()> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_INIT_DB: {}", schema);

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComInitDb { schema }.encode(&mut buf);
        self.packets.send(&buf)?;
        self.receive_ok()?;
        Ok(())
    }

    pub fn ping(&mut self) -> crate::Result<()> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_PING");

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComPing.encode(&mut buf);
        self.packets.send(&buf)?;
        self.receive_ok()?;
        Ok(())
    }

    pub fn refresh(&mut self, flags: RefreshFlags) -> crate::Result<()> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_REFRESH: {:?}", flags);

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComRefresh { flags }.encode(&mut buf);
        self.packets.send(&buf)?;
        self.receive_ok()?;
        Ok(())
    }

    /// The server's human-readable uptime/throughput line, as returned verbatim by
    /// `COM_STATISTICS`. Unlike every other command, the reply carries no OK/ERR framing
    /// at all — it's a bare string.
    pub fn stats(&mut self) -> crate::Result<String> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_STATISTICS");

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComStatistics.encode(&mut buf);
        self.packets.send(&buf)?;

        let reply = self.packets.receive()?;
        Ok(String::from_utf8_lossy(reply).into_owned())
    }

    /// Toggles support for semicolon-separated multi-statement queries. The server's
    /// reply to `COM_SET_OPTION` is shaped like an EOF packet, not an OK packet.
    pub fn enable_multi_statements(&mut self, on: bool) -> crate::Result<()> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_SET_OPTION (multi-statements {})", if on { "on" } else { "off" });

        self.packets.begin_command();
        let mut buf = Vec::new();
        ComSetOption {
            option: if on {
                SetOption::MultiStatementsOn
            } else {
                SetOption::MultiStatementsOff
            },
        }
        .encode(&mut buf);
        self.packets.send(&buf)?;

        let reply = self.packets.receive()?;
        if reply.first() == Some(&0xFF) {
            return Err(read_err_packet(reply)?.into());
        }
        EofPacket::read(reply)?;
        Ok(())
    }

    /// Sends `COM_QUIT` and consumes the connection; the server never replies.
    pub fn quit(mut self) {
        debug!("dispatching COM_QUIT (connection id {})", self.connection_id);
        self.packets.begin_command();
        let mut buf = Vec::new();
        ComQuit.encode(&mut buf);
        let _ = self.packets.send(&buf);
        let _ = self.packets.close();
    }

    pub fn prepare<'s>(&'s mut self, query: &str) -> crate::Result<PreparedStatement<'s, T>> {
        self.ensure_not_pending()?;
        trace!("dispatching COM_STMT_PREPARE: {}", query);
        PreparedStatement::prepare(self, query)
    }

    fn receive_ok(&mut self) -> crate::Result<OkPacket> {
        let reply = self.packets.receive()?;
        match reply.first().copied() {
            Some(0x00) => {
                let ok = OkPacket::read(reply)?;
                self.status = ok.status;
                Ok(ok)
            }
            Some(0xFF) => Err(read_err_packet(reply)?.into()),
            other => Err(protocol_err!("expected OK or ERR packet; received {:?}", other).into()),
        }
    }
}

impl MySqlConnection {
    pub fn connect(options: ConnectOptions) -> crate::Result<Self> {
        let transport = TcpTransport::connect(&options.host, options.port)?;
        Self::with_transport(transport, options)
    }
}

impl Poolable for MySqlConnection {
    fn is_closed(&self) -> bool {
        self.packets.is_killed()
    }

    fn reconnect(options: &ConnectOptions) -> crate::Result<Self> {
        Self::connect(options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    const HANDSHAKE_MARIADB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";
    const OK_HANDSHAKE: &[u8] = b"\x00\x00\x00\x02@\x00\x00";

    fn push_packet(mock: &mut MockTransport, seq_no: u8, payload: &[u8]) {
        let mut header = [0u8; 4];
        byteorder::LittleEndian::write_u24(&mut header[..3], payload.len() as u32);
        header[3] = seq_no;
        mock.push_read(&header);
        mock.push_read(payload);
    }

    fn options() -> ConnectOptions {
        ConnectOptions {
            host: "localhost".into(),
            port: 3306,
            user: "root".into(),
            password: String::new(),
            database: None,
        }
    }

    #[test]
    fn it_connects_and_authenticates() {
        let mut mock = MockTransport::new();
        push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
        push_packet(&mut mock, 2, OK_HANDSHAKE);

        let conn = Connection::with_transport(mock, options()).unwrap();
        assert_eq!(conn.server_version(), "5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic");
        assert_eq!(conn.connection_id(), 11);
        assert!(conn.status().contains(Status::SERVER_STATUS_AUTOCOMMIT));
    }

    #[test]
    fn it_fails_auth_on_login_err_packet() {
        let mut mock = MockTransport::new();
        push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
        push_packet(&mut mock, 2, b"\xff\x15\x04#28000Access denied");

        let err = Connection::with_transport(mock, options()).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn it_fails_when_the_greeting_is_an_err_packet() {
        let mut mock = MockTransport::new();
        push_packet(&mut mock, 0, b"\xff\x19\x04#08004Too many connections");

        let err = Connection::with_transport(mock, options()).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn it_runs_ping_after_connecting() {
        let mut mock = MockTransport::new();
        push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
        push_packet(&mut mock, 2, OK_HANDSHAKE);
        push_packet(&mut mock, 1, OK_HANDSHAKE);

        let mut conn = Connection::with_transport(mock, options()).unwrap();
        conn.ping().unwrap();
    }

    #[test]
    fn it_refuses_a_new_command_while_a_result_is_pending() {
        let mut mock = MockTransport::new();
        push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
        push_packet(&mut mock, 2, OK_HANDSHAKE);

        let mut conn = Connection::with_transport(mock, options()).unwrap();
        conn.rows_pending = true;
        assert!(matches!(conn.ping().unwrap_err(), Error::DataPending));
    }
}
