use std::rc::Rc;

use crate::io::{Buf, LenEnc};
use crate::packet::PacketStream;
use crate::protocol::column_def::ColumnDefinition;
use crate::protocol::eof::EofPacket;
use crate::protocol::err::read_err_packet;
use crate::protocol::ok::OkPacket;
use crate::transport::Transport;
use crate::value::Value;

/// What the first packet of a command's response turned out to be.
pub(crate) enum CommandOutcome {
    Ok {
        affected_rows: u64,
        last_insert_id: u64,
    },
    ResultSet {
        columns: Rc<[ColumnDefinition]>,
        warnings: u16,
    },
}

/// Classifies and, for a result set, fully reads the column-definition header: a
/// column-count LCB, that many `ColumnDefinition` packets, then one EOF.
///
/// Column definitions are read eagerly rather than lazily — there is no advantage to
/// deferring them on a blocking transport, so unlike an async generator this never
/// leaves `headers_pending` true by the time a caller observes a `ResultSet` outcome.
pub(crate) fn dispatch<T: Transport>(packets: &mut PacketStream<T>) -> crate::Result<CommandOutcome> {
    let packet = packets.receive()?;
    match packet.first().copied() {
        Some(0xFF) => Err(read_err_packet(packet)?.into()),
        Some(0x00) => {
            let ok = OkPacket::read(packet)?;
            Ok(CommandOutcome::Ok {
                affected_rows: ok.affected_rows,
                last_insert_id: ok.last_insert_id,
            })
        }
        _ => {
            let column_count = column_count(packet)?;
            let mut columns = Vec::with_capacity(column_count as usize);
            for _ in 0..column_count {
                let packet = packets.receive()?;
                columns.push(ColumnDefinition::read(packet)?);
            }

            let eof = EofPacket::read(packets.receive()?)?;
            Ok(CommandOutcome::ResultSet {
                columns: Rc::from(columns),
                warnings: eof.warnings,
            })
        }
    }
}

fn column_count(packet: &[u8]) -> crate::Result<u64> {
    let mut buf = packet;
    match buf.get_uint_lenenc()? {
        LenEnc::Value(v) => Ok(v),
        _ => Err(protocol_err!("malformed column-count prefix").into()),
    }
}

/// Reads the next row packet, or `None` at the terminating EOF.
pub(crate) fn next_row<T: Transport>(
    packets: &mut PacketStream<T>,
    columns: &[ColumnDefinition],
    binary: bool,
) -> crate::Result<Option<Vec<Value>>> {
    let packet = packets.receive()?;
    if EofPacket::looks_like_eof(packet) {
        return Ok(None);
    }

    Ok(Some(crate::protocol::row::decode_row(packet, columns, binary)?))
}

/// Drains remaining row packets up to and including the terminating EOF, as required
/// when a cursor is abandoned before exhaustion. Returns the count of rows drained.
pub(crate) fn purge<T: Transport>(
    packets: &mut PacketStream<T>,
    columns: &[ColumnDefinition],
    binary: bool,
) -> crate::Result<u64> {
    let mut drained = 0u64;
    while next_row(packets, columns, binary)?.is_some() {
        drained += 1;
    }
    Ok(drained)
}
