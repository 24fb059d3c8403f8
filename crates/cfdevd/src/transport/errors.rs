//! Failures raised while claiming or serving the helper socket.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind helper socket {path}: {source}")]
    Bind {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Unprivileged clients could not be granted access.
    #[error("failed to open helper socket {path} to unprivileged clients: {source}")]
    Permissions {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Another helper is already serving this path.
    #[error("another helper is already serving {path}")]
    InUse { path: Utf8PathBuf },
    /// Something other than a socket occupies the path; it is left untouched.
    #[error("refusing to replace {path}: not a socket")]
    NotSocket { path: Utf8PathBuf },
    #[error("failed to inspect existing file at {path}: {source}")]
    Metadata {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Probing an existing socket failed for a reason other than refusal.
    #[error("failed to probe existing helper socket {path}: {source}")]
    Connect {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove stale helper socket {path}: {source}")]
    Cleanup {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to switch helper socket to non-blocking accepts: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[error("accept thread panicked")]
    ThreadPanic,
}
