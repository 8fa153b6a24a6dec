use crate::options::ConnectOptions;

/// What a pool needs a connection to implement.
///
/// This crate does not implement a pool: queuing, backpressure, and idle-connection
/// management are all external collaborators. This trait is the interface such a pool
/// would lease against — report whether a held connection has gone bad, and rebuild a
/// fresh one from the options it was last opened with.
pub trait Poolable: Sized {
    fn is_closed(&self) -> bool;

    fn reconnect(options: &ConnectOptions) -> crate::Result<Self>;
}
