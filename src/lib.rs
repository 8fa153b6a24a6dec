#![forbid(unsafe_code)]

//! A native, synchronous client driver for the MySQL/MariaDB wire protocol
//! (server versions 4.1.1 and later, protocol version 10).
//!
//! The driver speaks the client/server protocol directly over a [`Transport`]; it does
//! not wrap `libmysqlclient` or any other native client library. TLS, compressed
//! packets, multi-statements, and binlog replication are negotiated as disabled and are
//! not implemented here.

#[macro_use]
pub mod error;

mod io;

pub mod protocol;

mod bind;
mod options;
mod packet;
mod pool;
mod row;
mod transport;
mod value;

pub mod connection;

pub use bind::BindParameter;
pub use connection::{Connection, MySqlConnection};
pub use connection::prepared::PreparedStatement;
pub use connection::result::{ResultSet, ResultStream};
pub use error::{Error, Result};
pub use options::ConnectOptions;
pub use pool::Poolable;
pub use row::Row;
pub use transport::{TcpTransport, Transport};
pub use value::Value;

#[cfg(any(test, feature = "mock-transport"))]
pub use transport::mock::MockTransport;
