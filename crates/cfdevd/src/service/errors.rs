//! Error types for service installation.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::host_command::HostCommandError;

/// Errors raised while installing or removing the persistent service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A directory needed by the installation could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The executable could not be copied into place.
    #[error("failed to install executable {from} to {to}: {source}")]
    CopyExecutable {
        /// Source executable.
        from: Utf8PathBuf,
        /// Installed program path.
        to: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The service descriptor could not be written.
    #[error("failed to write service descriptor {path}: {source}")]
    WriteDescriptor {
        /// Descriptor path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// An installed file could not be removed.
    #[error("failed to remove {path}: {source}")]
    Remove {
        /// File that could not be removed.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The supervisor rejected the registration.
    #[error("failed to register service {label}: {source}")]
    Register {
        /// Service label.
        label: String,
        /// Supervisor tool failure.
        #[source]
        source: HostCommandError,
    },
    /// The supervisor rejected the deregistration.
    #[error("failed to deregister service {label}: {source}")]
    Deregister {
        /// Service label.
        label: String,
        /// Supervisor tool failure.
        #[source]
        source: HostCommandError,
    },
}
