//! Shared configuration for the cfdevd privileged helper and its clients.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path` or `CFDEVD_CONFIG_PATH`), then
//! `CFDEVD_*` environment variables, then command-line flags. The daemon and
//! the client library read the same structure so both agree on the socket
//! path and on the service layout installed on the host.

mod defaults;
mod logging;
mod socket;

use std::net::Ipv4Addr;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DIRECTOR_IP, DEFAULT_LOG_FILTER, DEFAULT_ROUTER_IP, DEFAULT_SERVICE_LABEL,
    DEFAULT_SOCKET_PATH, default_log_filter, default_log_format, default_program_path,
    default_service_dir, default_socket_path, default_stderr_path, default_stdout_path,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketPreparationError, prepare_socket_directory};

/// Resolved configuration for the helper daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CFDEVD")]
pub struct Config {
    /// Unix socket the daemon listens on.
    #[ortho_config(default = defaults::default_socket_path())]
    pub daemon_socket: Utf8PathBuf,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Label the host service supervisor knows the daemon by.
    #[ortho_config(default = defaults::default_service_label_string())]
    pub service_label: String,
    /// Directory holding service descriptors.
    #[ortho_config(default = defaults::default_service_dir())]
    pub service_dir: Utf8PathBuf,
    /// Path the daemon executable is installed to.
    #[ortho_config(default = defaults::default_program_path())]
    pub program_path: Utf8PathBuf,
    /// File receiving the installed daemon's standard output.
    #[ortho_config(default = defaults::default_stdout_path())]
    pub stdout_path: Utf8PathBuf,
    /// File receiving the installed daemon's standard error.
    #[ortho_config(default = defaults::default_stderr_path())]
    pub stderr_path: Utf8PathBuf,
    /// Loopback alias for the BOSH director.
    #[ortho_config(default = defaults::DEFAULT_DIRECTOR_IP)]
    pub director_ip: Ipv4Addr,
    /// Loopback alias for the Cloud Foundry router.
    #[ortho_config(default = defaults::DEFAULT_ROUTER_IP)]
    pub router_ip: Ipv4Addr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_path(),
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
            service_label: defaults::default_service_label_string(),
            service_dir: default_service_dir(),
            program_path: default_program_path(),
            stdout_path: default_stdout_path(),
            stderr_path: default_stderr_path(),
            director_ip: DEFAULT_DIRECTOR_IP,
            router_ip: DEFAULT_ROUTER_IP,
        }
    }
}

impl Config {
    /// Socket path shared by the daemon and its clients.
    #[must_use]
    pub fn daemon_socket(&self) -> &Utf8Path {
        self.daemon_socket.as_path()
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Service label.
    #[must_use]
    pub fn service_label(&self) -> &str {
        &self.service_label
    }

    /// Directory holding service descriptors.
    #[must_use]
    pub fn service_dir(&self) -> &Utf8Path {
        self.service_dir.as_path()
    }

    /// Installed executable path.
    #[must_use]
    pub fn program_path(&self) -> &Utf8Path {
        self.program_path.as_path()
    }

    /// Standard output log of the installed service.
    #[must_use]
    pub fn stdout_path(&self) -> &Utf8Path {
        self.stdout_path.as_path()
    }

    /// Standard error log of the installed service.
    #[must_use]
    pub fn stderr_path(&self) -> &Utf8Path {
        self.stderr_path.as_path()
    }

    /// Addresses added to and removed from the loopback interface.
    #[must_use]
    pub fn loopback_aliases(&self) -> [Ipv4Addr; 2] {
        [self.director_ip, self.router_ip]
    }
}
