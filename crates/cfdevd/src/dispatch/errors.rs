//! Error types for connection dispatch failures.

use std::io;

use thiserror::Error;

use cfdev_protocol::{CommandCode, DecodeError};

/// Errors that end a connection before or instead of a reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The peer closed the connection inside the handshake.
    #[error("connection closed during handshake")]
    TruncatedHandshake,

    /// The peer closed the connection before sending a command byte.
    #[error("connection closed before a command was sent")]
    MissingCommand,

    /// The peer closed the connection inside a command payload.
    #[error("connection closed before the {code} payload was complete")]
    TruncatedPayload { code: CommandCode },

    /// A received frame could not be decoded.
    #[error("malformed frame: {0}")]
    Decode(#[from] DecodeError),

    /// The command code is not one the helper implements.
    #[error("unimplemented command code {code}")]
    Unimplemented { code: u8 },

    /// Reading from the connection failed.
    #[error("failed to read from connection: {0}")]
    Read(#[source] io::Error),

    /// Writing to the connection failed.
    #[error("failed to write to connection: {0}")]
    Write(#[source] io::Error),
}

impl DispatchError {
    /// Returns true when the peer simply went away.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::TruncatedHandshake | Self::MissingCommand | Self::TruncatedPayload { .. }
        )
    }

    /// Maps a read failure, treating end-of-stream as `eof`.
    pub(crate) fn from_read(error: io::Error, eof: Self) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            eof
        } else {
            Self::Read(error)
        }
    }
}
