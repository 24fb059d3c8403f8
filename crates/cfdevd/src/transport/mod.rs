//! Unix socket listener for the privileged helper.
//!
//! The transport binds the well-known socket, accepts connections in a
//! background thread, and hands each connection to its own handler thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::{HANDLER_DRAIN_TIMEOUT, SocketListener};
#[cfg(test)]
pub(crate) use self::listener::ListenerHandle;
#[cfg(test)]
pub(crate) use self::test_utils::{BlockingHandler, CountingHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
