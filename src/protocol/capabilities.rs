// https://dev.mysql.com/doc/dev/mysql-server/latest/group__group__cs__capabilities__flags.html
// https://mariadb.com/kb/en/connection/#capabilities
bitflags::bitflags! {
    pub(crate) struct Capabilities: u64 {
        const MYSQL = 1;
        const FOUND_ROWS = 2;
        const LONG_FLAG = 4;
        const CONNECT_WITH_DB = 8;
        const NO_SCHEMA = 16;
        const COMPRESS = 32;
        const ODBC = 64;
        const LOCAL_FILES = 128;
        const IGNORE_SPACE = 256;
        const PROTOCOL_41 = 512;
        const INTERACTIVE = 1024;
        const SSL = 2048;
        const IGNORE_SIGPIPE = 4096;
        const TRANSACTIONS = 8192;
        const RESERVED = 16384;
        const SECURE_CONNECTION = 32768;
        const MULTI_STATEMENTS = 1 << 16;
        const MULTI_RESULTS = 1 << 17;
        const PS_MULTI_RESULTS = 1 << 18;
        const PLUGIN_AUTH = 1 << 19;
        const CONNECT_ATTRS = 1 << 20;
        const PLUGIN_AUTH_LENENC_DATA = 1 << 21;
        const CAN_HANDLE_EXPIRED_PASSWORDS = 1 << 22;
        const SESSION_TRACK = 1 << 23;
        const DEPRECATE_EOF = 1 << 24;
        const SSL_VERIFY_SERVER_CERT = 1 << 30;
        const REMEMBER_OPTIONS = 1 << 31;
    }
}

/// The flags this driver asks for in every handshake response.
///
/// `PROTOCOL_41` and `SECURE_CONNECTION` are required; the driver does not implement
/// the pre-4.1 handshake. `MULTI_STATEMENTS`/`MULTI_RESULTS` are negotiated separately
/// by `enable_multi_statements`, not requested up front.
pub(crate) const CLIENT_CAPABILITIES: Capabilities = Capabilities::from_bits_truncate(
    Capabilities::MYSQL.bits()
        | Capabilities::PROTOCOL_41.bits()
        | Capabilities::SECURE_CONNECTION.bits()
        | Capabilities::PLUGIN_AUTH.bits()
        | Capabilities::PLUGIN_AUTH_LENENC_DATA.bits()
        | Capabilities::CONNECT_WITH_DB.bits()
        | Capabilities::TRANSACTIONS.bits()
        | Capabilities::FOUND_ROWS.bits()
        | Capabilities::LONG_FLAG.bits(),
);
