//! Wire codec for the cfdevd privileged helper protocol.
//!
//! Every connection to the helper carries exactly one exchange:
//!
//! 1. The client sends a 49 byte [`Handshake`] and the daemon answers with its
//!    own.
//! 2. The client sends a one byte [`CommandCode`] followed by the payload for
//!    that command (only `bind` carries one, see [`BindRequest`]).
//! 3. The daemon replies with a [`BindStatus`] frame (plus an `SCM_RIGHTS`
//!    control message on success) or a one byte [`CommandStatus`].
//!
//! This crate only converts between typed values and bytes. Sockets, file
//! descriptor passing, and retries live in the daemon and client crates.

mod command;
mod handshake;
mod status;

use thiserror::Error;

pub use command::{BIND_PAYLOAD_LEN, BindRequest, Command, CommandCode};
pub use handshake::{
    CLIENT_IDENTITY, HANDSHAKE_LEN, Handshake, IDENTITY_LEN, PADDING_LEN, PROTOCOL_VERSION,
    SERVER_IDENTITY,
};
pub use status::{BIND_REPLY_LEN, BindStatus, COMMAND_REPLY_LEN, CommandStatus};

/// Errors raised when a byte buffer does not hold a complete frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer length did not match the fixed frame size.
    #[error("{frame} frame must be {expected} bytes, received {actual}")]
    Length {
        /// Frame being decoded.
        frame: &'static str,
        /// Size mandated by the protocol.
        expected: usize,
        /// Size of the supplied buffer.
        actual: usize,
    },
}

impl DecodeError {
    pub(crate) const fn length(frame: &'static str, expected: usize, actual: usize) -> Self {
        Self::Length {
            frame,
            expected,
            actual,
        }
    }
}
