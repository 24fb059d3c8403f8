//! Helper bootstrap: configuration, telemetry, and socket directory.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use cfdev_config::{Config, SocketPreparationError, prepare_socket_directory};

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the helper configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that layers defaults, the configuration file, `CFDEVD_*`
/// environment variables, and the supplied command-line flags.
#[derive(Debug, Default, Clone)]
pub struct SystemConfigLoader {
    args: Vec<OsString>,
}

impl SystemConfigLoader {
    /// Builds a loader over `args`, whose first element is the program name.
    #[must_use]
    pub const fn new(args: Vec<OsString>) -> Self {
        Self { args }
    }
}

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        if self.args.is_empty() {
            Config::load()
        } else {
            Config::load_from_iter(self.args.iter().cloned())
        }
    }
}

/// Loader that always yields a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
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
    /// Socket preparation failed.
    #[error("failed to prepare helper socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
}

/// Outcome of a successful bootstrap.
#[derive(Debug)]
pub struct Bootstrapped {
    config: Config,
    telemetry: TelemetryHandle,
}

impl Bootstrapped {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Consumes the bootstrap result, yielding its configuration.
    #[must_use]
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Loads configuration, installs telemetry, and prepares the socket
/// directory, reporting each outcome to `reporter`.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Bootstrapped, BootstrapError> {
    reporter.bootstrap_starting();

    let result = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })
        .and_then(|config| {
            let telemetry = telemetry::initialise(&config)
                .map_err(|source| BootstrapError::Telemetry { source })?;
            prepare_socket_directory(config.daemon_socket())
                .map_err(|source| BootstrapError::Socket { source })?;
            Ok(Bootstrapped { config, telemetry })
        });

    match &result {
        Ok(bootstrapped) => reporter.bootstrap_succeeded(bootstrapped.config()),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}
