//! Defines the unified error surface for the helper's entry points.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::service::ServiceError;
use crate::telemetry::TelemetryError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while running, installing, or uninstalling the helper.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The command line could not be parsed.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Bootstrapping the helper failed.
    #[error("helper bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Socket listener startup failed.
    #[error("helper socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The running executable could not be located.
    #[error("failed to locate the running executable: {source}")]
    CurrentExecutable {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The running executable's path is not UTF-8.
    #[error("executable path {path:?} is not valid UTF-8")]
    NonUtf8Executable {
        /// Offending path.
        path: PathBuf,
    },
    /// Installing or uninstalling the service failed.
    #[error("service operation failed: {source}")]
    Service {
        /// Underlying installer error.
        #[source]
        source: ServiceError,
    },
}

impl From<Arc<OrthoError>> for LaunchError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Config { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<ServiceError> for LaunchError {
    fn from(source: ServiceError) -> Self {
        Self::Service { source }
    }
}
