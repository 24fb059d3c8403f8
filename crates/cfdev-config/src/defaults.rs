use std::net::Ipv4Addr;

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Well-known socket path of the helper daemon.
pub const DEFAULT_SOCKET_PATH: &str = "/var/tmp/cfdevd.socket";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Label the daemon is registered under.
pub const DEFAULT_SERVICE_LABEL: &str = "org.cloudfoundry.cfdevd";

/// BOSH director address aliased onto loopback.
pub const DEFAULT_DIRECTOR_IP: Ipv4Addr = Ipv4Addr::new(10, 245, 0, 2);

/// Cloud Foundry router address aliased onto loopback.
pub const DEFAULT_ROUTER_IP: Ipv4Addr = Ipv4Addr::new(10, 144, 0, 34);

#[cfg(target_os = "macos")]
const SERVICE_DIR: &str = "/Library/LaunchDaemons";
#[cfg(not(target_os = "macos"))]
const SERVICE_DIR: &str = "/etc/systemd/system";

#[cfg(target_os = "macos")]
const PROGRAM_DIR: &str = "/Library/PrivilegedHelperTools";
#[cfg(not(target_os = "macos"))]
const PROGRAM_DIR: &str = "/usr/local/libexec";

/// Default socket path for the daemon.
pub fn default_socket_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

pub(crate) fn default_service_label_string() -> String {
    DEFAULT_SERVICE_LABEL.to_owned()
}

/// Directory the host service supervisor reads descriptors from.
pub fn default_service_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(SERVICE_DIR)
}

/// Where `install` places the daemon executable.
pub fn default_program_path() -> Utf8PathBuf {
    Utf8PathBuf::from(PROGRAM_DIR).join(DEFAULT_SERVICE_LABEL)
}

/// Standard output log of the installed service.
pub fn default_stdout_path() -> Utf8PathBuf {
    Utf8PathBuf::from("/var/tmp/cfdevd.stdout.log")
}

/// Standard error log of the installed service.
pub fn default_stderr_path() -> Utf8PathBuf {
    Utf8PathBuf::from("/var/tmp/cfdevd.stderr.log")
}
