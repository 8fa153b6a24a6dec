use std::rc::Rc;

use crate::connection::{ingest, Connection};
use crate::protocol::column_def::ColumnDefinition;
use crate::row::Row;
use crate::transport::Transport;

/// A cursor over a connection's current in-flight result rows.
///
/// Borrows the connection exclusively for its lifetime, so the borrow checker rules out
/// issuing a new command while a stream is alive — there is no separate command-id check
/// to invalidate a stale cursor, because a stale cursor cannot coexist with a live `&mut
/// Connection` in the first place.
pub struct ResultStream<'c, T: Transport> {
    connection: &'c mut Connection<T>,
    columns: Rc<[ColumnDefinition]>,
    binary: bool,
    done: bool,
}

impl<'c, T: Transport> ResultStream<'c, T> {
    pub(crate) fn new(connection: &'c mut Connection<T>, columns: Rc<[ColumnDefinition]>, binary: bool) -> Self {
        Self {
            connection,
            columns,
            binary,
            done: false,
        }
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Reads the next row, or `None` once the terminating EOF has been consumed.
    pub fn next(&mut self) -> crate::Result<Option<Row>> {
        if self.done {
            return Ok(None);
        }

        match ingest::next_row(&mut self.connection.packets, &self.columns, self.binary)? {
            Some(values) => Ok(Some(Row {
                columns: Rc::clone(&self.columns),
                values,
            })),
            None => {
                self.done = true;
                self.connection.rows_pending = false;
                self.connection.binary_pending = false;
                Ok(None)
            }
        }
    }

    /// Materializes every remaining row into a [`ResultSet`].
    pub fn collect(mut self) -> crate::Result<ResultSet> {
        let mut rows = Vec::new();
        while let Some(row) = self.next()? {
            rows.push(row);
        }
        Ok(ResultSet {
            columns: Rc::clone(&self.columns),
            rows,
        })
    }
}

impl<'c, T: Transport> Drop for ResultStream<'c, T> {
    fn drop(&mut self) {
        if !self.done {
            let _ = ingest::purge(&mut self.connection.packets, &self.columns, self.binary);
            self.connection.rows_pending = false;
            self.connection.binary_pending = false;
        }
    }
}

/// A buffered materialization of a [`ResultStream`]: every row already read into memory.
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Rc<[ColumnDefinition]>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
