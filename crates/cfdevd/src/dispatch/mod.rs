//! Per-connection protocol handling.
//!
//! Every connection carries exactly one exchange:
//!
//! 1. the client sends a 49-byte handshake and the helper answers with its
//!    own, whatever the client sent;
//! 2. the client sends a one-byte command code plus any fixed payload;
//! 3. the helper performs the privileged operation and writes one reply.
//!
//! Bind replies are eight bytes whose first byte is the status; on success
//! the bound listener travels alongside as `SCM_RIGHTS` ancillary data.
//! Alias and uninstall replies are a single byte, `0` for success and `1` for
//! failure. Unknown codes are logged and the connection is closed without a
//! reply.

mod bind;
mod command;
mod errors;
mod handler;
mod handshake;
mod router;
mod services;

pub use self::errors::DispatchError;
pub(crate) use self::handler::CommandConnectionHandler;
pub use self::services::DaemonServices;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
