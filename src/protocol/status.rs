// https://dev.mysql.com/doc/dev/mysql-server/latest/mysql__com_8h.html
// https://mariadb.com/kb/en/ok_packet/#server-status-flag
bitflags::bitflags! {
    pub struct Status: u16 {
        const SERVER_STATUS_IN_TRANS = 1;
        const SERVER_STATUS_AUTOCOMMIT = 2;
        const SERVER_MORE_RESULTS_EXISTS = 8;
        const SERVER_STATUS_NO_GOOD_INDEX_USED = 16;
        const SERVER_STATUS_NO_INDEX_USED = 32;
        const SERVER_STATUS_CURSOR_EXISTS = 64;
        const SERVER_STATUS_LAST_ROW_SENT = 128;
        const SERVER_STATUS_DB_DROPPED = 256;
        const SERVER_STATUS_NO_BACKSLASH_ESCAPES = 512;
        const SERVER_STATUS_METADATA_CHANGED = 1024;
        const SERVER_QUERY_WAS_SLOW = 2048;
        const SERVER_PS_OUT_PARAMS = 4096;
        const SERVER_STATUS_IN_TRANS_READONLY = 8192;
        const SERVER_SESSION_STATE_CHANGED = 1 << 14;
    }
}
