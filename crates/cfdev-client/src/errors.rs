//! Error types returned by the helper client.

use std::io;
use std::process::ExitStatus;

use camino::Utf8PathBuf;
use thiserror::Error;

use cfdev_protocol::{BindStatus, CommandCode, DecodeError};

/// Failures while talking to the privileged helper.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The helper socket could not be reached.
    #[error("failed to connect to cfdevd at {socket}: {source}")]
    Connect {
        /// Socket the client dialled.
        socket: Utf8PathBuf,
        /// Underlying connect failure.
        #[source]
        source: io::Error,
    },
    /// Writing the client handshake failed.
    #[error("failed to send handshake: {0}")]
    SendHandshake(#[source] io::Error),
    /// The helper closed or stalled before its handshake arrived.
    #[error("failed to read handshake: {0}")]
    ReadHandshake(#[source] io::Error),
    /// The handshake bytes could not be decoded.
    #[error("malformed handshake: {0}")]
    MalformedHandshake(#[from] DecodeError),
    /// The peer answered with an identity other than the helper's.
    #[error("peer identified itself as {identity:?}, not cfdevd")]
    ForeignPeer {
        /// Identity tag the peer sent, lossily decoded.
        identity: String,
    },
    /// Writing the command frame failed.
    #[error("failed to send {command} command: {source}")]
    SendCommand {
        /// Command being sent.
        command: CommandCode,
        /// Underlying write failure.
        #[source]
        source: io::Error,
    },
    /// Reading the reply to a command failed.
    #[error("failed to read {command} reply: {source}")]
    ReadReply {
        /// Command whose reply was expected.
        command: CommandCode,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// A successful bind reply arrived without a listener descriptor.
    #[error("bind reply carried no file descriptor")]
    MissingDescriptor,
    /// The helper could not bind the requested address.
    #[error("bind failed: {0}")]
    Bind(BindStatus),
    /// The helper reported failure for an alias or uninstall command.
    #[error("{command} failed on the helper")]
    CommandFailed {
        /// Command that failed.
        command: CommandCode,
    },
}

/// Failures while elevating the helper's own installer.
#[derive(Debug, Error)]
pub enum InstallationError {
    /// The privilege-escalation tool could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// The installer ran but exited unsuccessfully.
    #[error("installer exited with {status}")]
    Failed {
        /// Exit status of the installer.
        status: ExitStatus,
    },
}
