use std::rc::Rc;

use crate::bind::{BindParameter, BoundValue};
use crate::connection::result::ResultStream;
use crate::connection::{ingest, Connection};
use crate::error::Error;
use crate::protocol::column_def::ColumnDefinition;
use crate::protocol::eof::EofPacket;
use crate::protocol::statement::{ComStmtClose, ComStmtExecute, ComStmtPrepare, ComStmtPrepareOk, ComStmtSendLongData, Cursor};
use crate::transport::Transport;

/// A server-side prepared statement.
///
/// Holds the connection exclusively for its lifetime, the same way [`super::ResultStream`]
/// does, for the same reason: a prepared statement's arguments are bound against this one
/// connection's wire state, and two live statements issuing interleaved commands on the
/// same connection would corrupt the sequence counter.
///
/// Released via `COM_STMT_CLOSE` on [`Self::close`] or, if never called, on drop
/// (best-effort — transport errors during the drop-time release are swallowed, since the
/// connection may already be dead).
pub struct PreparedStatement<'c, T: Transport> {
    connection: &'c mut Connection<T>,
    statement_id: u32,
    param_count: u16,
    columns: Rc<[ColumnDefinition]>,
    closed: bool,
}

impl<'c, T: Transport> PreparedStatement<'c, T> {
    pub(crate) fn prepare(connection: &'c mut Connection<T>, query: &str) -> crate::Result<Self> {
        connection.packets.begin_command();
        let mut buf = Vec::new();
        ComStmtPrepare { query }.encode(&mut buf);
        connection.packets.send(&buf)?;

        let packet = connection.packets.receive()?;
        if packet.first() == Some(&0xFF) {
            return Err(crate::protocol::err::read_err_packet(packet)?.into());
        }
        let ok = ComStmtPrepareOk::read(packet)?;

        if ok.params > 0 {
            for _ in 0..ok.params {
                connection.packets.receive()?;
            }
            EofPacket::read(connection.packets.receive()?)?;
        }

        let mut columns = Vec::with_capacity(ok.columns as usize);
        if ok.columns > 0 {
            for _ in 0..ok.columns {
                let packet = connection.packets.receive()?;
                columns.push(ColumnDefinition::read(packet)?);
            }
            EofPacket::read(connection.packets.receive()?)?;
        }

        Ok(Self {
            connection,
            statement_id: ok.statement_id,
            param_count: ok.params,
            columns: Rc::from(columns),
            closed: false,
        })
    }

    pub fn param_count(&self) -> u16 {
        self.param_count
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Sends one chunk of a parameter's value out of band, ahead of [`Self::exec`] or
    /// [`Self::query`]. Call once per chunk; the server appends each chunk to that
    /// parameter's buffer. No reply is sent.
    pub fn send_long_data(&mut self, param_index: u16, chunk: &[u8]) -> crate::Result<()> {
        if self.closed {
            return Err(Error::NotPrepared);
        }

        self.connection.packets.begin_command();
        let mut buf = Vec::new();
        ComStmtSendLongData {
            statement_id: self.statement_id,
            param_index,
            chunk,
        }
        .encode(&mut buf);
        self.connection.packets.send(&buf)
    }

    /// Executes the statement, expecting no result set. Fails with
    /// [`Error::ResultReceived`] (after purging the spurious result set) if the statement
    /// produced rows.
    pub fn exec(&mut self, params: &[&dyn BindParameter]) -> crate::Result<u64> {
        match self.run(params)? {
            ingest::CommandOutcome::Ok {
                affected_rows,
                last_insert_id,
            } => {
                self.connection.last_insert_id = last_insert_id;
                Ok(affected_rows)
            }
            ingest::CommandOutcome::ResultSet { columns, .. } => {
                let _ = ingest::purge(&mut self.connection.packets, &columns, true)?;
                Err(Error::ResultReceived)
            }
        }
    }

    /// Executes the statement, expecting a result set. Fails with
    /// [`Error::NoResultReceived`] if the statement produced none.
    pub fn query<'s>(&'s mut self, params: &[&dyn BindParameter]) -> crate::Result<ResultStream<'s, T>> {
        match self.run(params)? {
            ingest::CommandOutcome::ResultSet { columns, .. } => {
                self.connection.rows_pending = true;
                self.connection.binary_pending = true;
                Ok(ResultStream::new(self.connection, columns, true))
            }
            ingest::CommandOutcome::Ok { .. } => Err(Error::NoResultReceived),
        }
    }

    fn run(&mut self, params: &[&dyn BindParameter]) -> crate::Result<ingest::CommandOutcome> {
        if self.closed {
            return Err(Error::NotPrepared);
        }
        if self.connection.has_pending() {
            return Err(Error::DataPending);
        }

        let bound = params
            .iter()
            .map(|p| p.bind())
            .collect::<Result<Vec<BoundValue>, Error>>()?;

        self.connection.packets.begin_command();
        let mut buf = Vec::new();
        ComStmtExecute {
            statement_id: self.statement_id,
            cursor: Cursor::NO_CURSOR,
        }
        .encode(&mut buf, &bound);
        self.connection.packets.send(&buf)?;

        ingest::dispatch(&mut self.connection.packets)
    }

    /// Releases the statement. Idempotent; calling this more than once, or letting the
    /// value drop afterward, is a no-op.
    pub fn close(mut self) -> crate::Result<()> {
        self.send_close()
    }

    fn send_close(&mut self) -> crate::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.connection.packets.begin_command();
        let mut buf = Vec::new();
        ComStmtClose {
            statement_id: self.statement_id,
        }
        .encode(&mut buf);
        self.connection.packets.send(&buf)
    }
}

impl<'c, T: Transport> Drop for PreparedStatement<'c, T> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.send_close();
        }
    }
}
