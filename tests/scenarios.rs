//! End-to-end scenarios driven against the in-memory mock transport: a full
//! handshake, then a command sequence, with every server byte scripted by hand.

use mysql_native::{ConnectOptions, Connection, Error, MockTransport};

const HANDSHAKE_MARIADB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";

/// A post-login OK packet: header, affected_rows=0, last_insert_id=0, status
/// (SERVER_STATUS_AUTOCOMMIT), warnings=0, empty info string.
const OK_HANDSHAKE: &[u8] = b"\x00\x00\x00\x02\x00\x00\x00";

fn push_packet(mock: &mut MockTransport, seq_no: u8, payload: &[u8]) {
    let len = payload.len() as u32;
    let header = [(len & 0xFF) as u8, ((len >> 8) & 0xFF) as u8, ((len >> 16) & 0xFF) as u8, seq_no];
    mock.push_read(&header);
    mock.push_read(payload);
}

fn lenenc_str(s: &str) -> Vec<u8> {
    assert!(s.len() < 251, "test helper only covers single-byte lengths");
    let mut out = vec![s.len() as u8];
    out.extend_from_slice(s.as_bytes());
    out
}

/// One text-protocol column-definition packet, per `protocol_com_query_response_text_resultset_column_definition`.
fn column_definition(name: &str, column_type: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(lenenc_str("def")); // catalog
    out.extend(lenenc_str("test")); // schema
    out.extend(lenenc_str("t")); // table alias
    out.extend(lenenc_str("t")); // table
    out.extend(lenenc_str(name)); // column alias
    out.extend(lenenc_str(name)); // column
    out.push(0x0c); // length of fixed fields
    out.extend_from_slice(&[0x21, 0x00]); // charset: utf8_general_ci
    out.extend_from_slice(&[0, 0, 0, 0]); // max size
    out.push(column_type);
    out.extend_from_slice(&[0, 0]); // field flags
    out.push(0); // decimals
    out
}

/// One text-protocol row with the given column values, NULL encoded as `None`.
fn text_row(values: &[Option<&str>]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        match v {
            Some(s) => out.extend(lenenc_str(s)),
            None => out.push(0xFB),
        }
    }
    out
}

const EOF: &[u8] = b"\xfe\x00\x00\x02\x00";

/// One binary-protocol row: header byte, a null bitmap with `null_cols` bits set
/// (bit index `i+2` for column `i`), then the fixed/length-coded value bytes for
/// whichever columns are non-null, in order.
fn binary_row(column_count: usize, null_cols: &[usize], value_bytes: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00];
    let bitmap_len = (column_count + 9) / 8;
    let mut bitmap = vec![0u8; bitmap_len];
    for &i in null_cols {
        let bit = i + 2;
        bitmap[bit / 8] |= 1 << (bit % 8);
    }
    out.extend(bitmap);
    out.extend_from_slice(value_bytes);
    out
}

fn connect(mock: MockTransport) -> Connection<MockTransport> {
    let options = ConnectOptions {
        host: "localhost".into(),
        port: 3306,
        user: "root".into(),
        password: String::new(),
        database: None,
    };
    Connection::with_transport(mock, options).unwrap()
}

#[test]
fn connect_and_query_a_single_column_result_set() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    // SHOW DATABASES-style response: one column, two rows, terminating EOF.
    push_packet(&mut mock, 1, &[1]); // column count = 1
    push_packet(&mut mock, 2, &column_definition("Database", 0x0f /* VARCHAR */));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, &text_row(&[Some("information_schema")]));
    push_packet(&mut mock, 5, &text_row(&[Some("test")]));
    push_packet(&mut mock, 6, EOF);

    let mut conn = connect(mock);
    assert!(!conn.server_version().is_empty());

    let rows = conn.query("SHOW DATABASES").unwrap().collect().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.get(0).unwrap().get(0).unwrap().as_str(), Some("information_schema"));
    assert_eq!(rows.get(1).unwrap().get(0).unwrap().as_str(), Some("test"));
}

#[test]
fn exec_on_a_statement_that_returns_rows_is_an_error_but_leaves_the_connection_usable() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    // First command: exec() called on a SELECT, misuse.
    push_packet(&mut mock, 1, &[1]);
    push_packet(&mut mock, 2, &column_definition("id", 0x03 /* LONG */));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, &text_row(&[Some("1")]));
    push_packet(&mut mock, 5, EOF);

    // Second command: a well-formed exec() that should succeed afterward, proving the
    // spurious result set above was fully drained rather than left desynchronized.
    push_packet(&mut mock, 1, OK_HANDSHAKE);

    let mut conn = connect(mock);

    let err = conn.exec("SELECT id FROM t").unwrap_err();
    assert!(matches!(err, Error::ResultReceived));

    let affected = conn.exec("DELETE FROM t").unwrap();
    assert_eq!(affected, 0);
}

#[test]
fn dropping_a_result_stream_before_exhaustion_drains_it_so_the_next_command_succeeds() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    push_packet(&mut mock, 1, &[1]);
    push_packet(&mut mock, 2, &column_definition("id", 0x03));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, &text_row(&[Some("1")]));
    push_packet(&mut mock, 5, &text_row(&[Some("2")]));
    push_packet(&mut mock, 6, EOF);

    // Only reachable if the dropped stream drained its own remaining row and EOF; the
    // connection's sequence counter resets to 0 for this new command regardless.
    push_packet(&mut mock, 1, OK_HANDSHAKE);

    let mut conn = connect(mock);
    {
        let mut stream = conn.query("SELECT id FROM t").unwrap();
        assert!(stream.next().unwrap().is_some());
        // `stream` drops here having read only the first of two rows.
    }

    conn.ping().unwrap();
}

#[test]
fn a_result_stream_over_zero_rows_yields_none_immediately() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    push_packet(&mut mock, 1, &[1]);
    push_packet(&mut mock, 2, &column_definition("id", 0x03));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, EOF); // no rows

    let mut conn = connect(mock);
    let mut stream = conn.query("SELECT id FROM t WHERE 1 = 0").unwrap();
    assert!(stream.next().unwrap().is_none());
    // A second read past exhaustion stays `None` rather than re-reading the wire.
    assert!(stream.next().unwrap().is_none());
}

#[test]
fn prepared_statement_roundtrip_reports_its_shape() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    // COM_STMT_PREPARE_OK: header, statement_id=7, columns=1, params=1, filler, warnings=0.
    let prepare_ok: &[u8] = &[0x00, 7, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0];
    push_packet(&mut mock, 1, prepare_ok);
    // one param column-def, then EOF
    push_packet(&mut mock, 2, &column_definition("?", 0x03));
    push_packet(&mut mock, 3, EOF);
    // one result column-def, then EOF
    push_packet(&mut mock, 4, &column_definition("id", 0x03));
    push_packet(&mut mock, 5, EOF);

    let mut conn = connect(mock);
    let stmt = conn.prepare("SELECT id FROM t WHERE id = ?").unwrap();
    assert_eq!(stmt.param_count(), 1);
    assert_eq!(stmt.columns().len(), 1);
    assert_eq!(stmt.columns()[0].name(), Some("id"));
}

#[test]
fn prepared_statement_exec_sends_a_bound_parameter_and_reports_affected_rows() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    // COM_STMT_PREPARE_OK: statement_id=9, columns=0, params=1
    let prepare_ok: &[u8] = &[0x00, 9, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0];
    push_packet(&mut mock, 1, prepare_ok);
    push_packet(&mut mock, 2, &column_definition("?", 0x03));
    push_packet(&mut mock, 3, EOF);

    // Reply to COM_STMT_EXECUTE: an OK packet, affected_rows=1.
    push_packet(&mut mock, 1, b"\x00\x01\x00\x02\x00\x00\x00");

    let mut conn = connect(mock);
    let mut stmt = conn.prepare("DELETE FROM t WHERE id = ?").unwrap();
    let affected = stmt.exec(&[&42i32]).unwrap();
    assert_eq!(affected, 1);
}

#[test]
fn prepared_statement_query_with_a_null_parameter_decodes_a_binary_null_row() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    // COM_STMT_PREPARE_OK: statement_id=3, columns=1, params=1
    let prepare_ok: &[u8] = &[0x00, 3, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0];
    push_packet(&mut mock, 1, prepare_ok);
    push_packet(&mut mock, 2, &column_definition("?", 0x03));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, &column_definition("value", 0x03));
    push_packet(&mut mock, 5, EOF);

    // Reply to COM_STMT_EXECUTE: a one-column binary result set whose single row is NULL.
    push_packet(&mut mock, 1, &[1]);
    push_packet(&mut mock, 2, &column_definition("value", 0x03));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, &binary_row(1, &[0], &[]));
    push_packet(&mut mock, 5, EOF);

    let mut conn = connect(mock);
    let mut stmt = conn.prepare("SELECT value FROM t WHERE id = ?").unwrap();
    let mut stream = stmt.query(&[&Option::<i32>::None]).unwrap();
    let row = stream.next().unwrap().unwrap();
    assert!(row.is_null(0));
    assert!(stream.next().unwrap().is_none());
}

#[test]
fn prepared_statement_query_roundtrips_a_non_null_binary_integer() {
    let mut mock = MockTransport::new();
    push_packet(&mut mock, 0, HANDSHAKE_MARIADB_10_4_7);
    push_packet(&mut mock, 2, OK_HANDSHAKE);

    let prepare_ok: &[u8] = &[0x00, 4, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0];
    push_packet(&mut mock, 1, prepare_ok);
    push_packet(&mut mock, 2, &column_definition("?", 0x03));
    push_packet(&mut mock, 3, EOF);
    push_packet(&mut mock, 4, &column_definition("value", 0x03));
    push_packet(&mut mock, 5, EOF);

    push_packet(&mut mock, 1, &[1]);
    push_packet(&mut mock, 2, &column_definition("value", 0x03));
    push_packet(&mut mock, 3, EOF);
    let row_value = 123i32.to_le_bytes();
    push_packet(&mut mock, 4, &binary_row(1, &[], &row_value));
    push_packet(&mut mock, 5, EOF);

    let mut conn = connect(mock);
    let mut stmt = conn.prepare("SELECT value FROM t WHERE id = ?").unwrap();
    let mut stream = stmt.query(&[&7i32]).unwrap();
    let row = stream.next().unwrap().unwrap();
    assert_eq!(row.get(0).unwrap().as_i64(), Some(123));
}
