//! Error and Result types.

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::io;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a driver operation can fail.
///
/// [`Error::Transport`] and [`Error::Protocol`] are fatal: by the time either is
/// returned, the connection that produced it has already been killed. The rest are
/// recoverable and leave the connection usable once any pending result is drained.
#[derive(Debug)]
pub enum Error {
    /// The underlying socket failed, hit EOF mid-read, or a write did not complete.
    Transport(io::Error),

    /// Bytes received from the server violate the documented wire protocol.
    Protocol(Box<str>),

    /// The server returned an ERR packet during the handshake or login.
    Auth(Box<str>),

    /// The server returned an ERR packet mid-session.
    Received(MySqlError),

    /// A new command was attempted while a prior result was still outstanding.
    DataPending,

    /// The `ResultStream` that would answer this call was invalidated by a later
    /// command on the same connection.
    InvalidatedRange,

    /// The prepared statement handle has already been released.
    NotPrepared,

    /// `exec` was called on a statement that produced a result set.
    ResultReceived,

    /// `query` was called on a statement that produced no result set.
    NoResultReceived,

    /// A prepared-statement argument's type has no binary encoding in this driver.
    UnsupportedParameter(&'static str),

    /// The connection string is malformed or names an unrecognized key.
    ConnectOptions(Box<str>),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Transport(error) => Some(error),
            Error::Received(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(error) => write!(f, "transport error: {}", error),
            Error::Protocol(message) => f.write_str(message),
            Error::Auth(message) => write!(f, "authentication failed: {}", message),
            Error::Received(error) => Display::fmt(error, f),
            Error::DataPending => {
                f.write_str("a new command was issued while a result was still pending")
            }
            Error::InvalidatedRange => {
                f.write_str("result stream was invalidated by a later command")
            }
            Error::NotPrepared => f.write_str("prepared statement has already been closed"),
            Error::ResultReceived => {
                f.write_str("exec() called on a statement that returned a result set")
            }
            Error::NoResultReceived => {
                f.write_str("query() called on a statement that returned no result set")
            }
            Error::UnsupportedParameter(ty) => {
                write!(f, "no binary encoding for parameter of type {}", ty)
            }
            Error::ConnectOptions(message) => write!(f, "invalid connection string: {}", message),
        }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(err: io::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<io::ErrorKind> for Error {
    #[inline]
    fn from(err: io::ErrorKind) -> Self {
        Error::Transport(err.into())
    }
}

impl From<MySqlError> for Error {
    #[inline]
    fn from(err: MySqlError) -> Self {
        Error::Received(err)
    }
}

impl From<ProtocolError<'_>> for Error {
    #[inline]
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err.args.to_string().into_boxed_str())
    }
}

/// An ERR packet returned by the server mid-session.
///
/// Carries the fields documented for `ReceivedError`: a numeric error code, the
/// five-character SQL state, and a human-readable message.
#[derive(Debug, Clone)]
pub struct MySqlError {
    pub error_code: u16,
    pub sql_state: Box<str>,
    pub message: Box<str>,
}

impl Display for MySqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.error_code, self.sql_state, self.message
        )
    }
}

impl StdError for MySqlError {}

/// Used by the `protocol_err!()` macro for a lazily evaluated conversion to
/// [`Error::Protocol`].
pub(crate) struct ProtocolError<'a> {
    pub args: fmt::Arguments<'a>,
}

macro_rules! protocol_err (
    ($($args:tt)*) => {
        $crate::error::ProtocolError { args: format_args!($($args)*) }
    }
);
