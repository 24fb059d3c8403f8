//! Privileged helper for the CF Dev development environment.
//!
//! `cfdevd` runs as root under the host's service supervisor and performs a
//! small set of operations that an unprivileged CLI cannot: binding TCP
//! listeners on privileged ports, aliasing the development VM's addresses
//! onto the loopback interface, and uninstalling itself. Requests arrive over
//! a world-accessible Unix socket using the fixed binary protocol defined in
//! [`cfdev_protocol`].
//!
//! A bound listener is handed to the caller as an open file descriptor, so
//! the caller owns the port without ever running privileged code.
//!
//! The binary has three modes:
//!
//! - no subcommand serves the socket in the foreground until `SIGTERM`,
//!   `SIGINT`, `SIGQUIT`, or `SIGHUP`;
//! - `install` copies the running executable into place and registers it
//!   with launchd (macOS) or systemd (elsewhere);
//! - `uninstall` deregisters the service and removes its files.

mod bootstrap;
mod cli;
mod dispatch;
mod health;
mod host_command;
mod network;
mod process;
mod service;
mod telemetry;
mod transport;

use std::ffi::OsString;

pub use bootstrap::{
    BootstrapError, Bootstrapped, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use cli::DaemonCommand;
pub use dispatch::{DaemonServices, DispatchError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use host_command::HostCommandError;
pub use network::{AliasError, LoopbackAliases, SystemLoopbackAliases};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, install_daemon,
    run_daemon, uninstall_daemon,
};
pub use service::{
    DaemonSpec, InstalledDaemon, Launchd, PlatformServiceManager, ServiceError,
    ServiceInstaller, ServiceLifecycle, ServiceManager, Systemd,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

/// Runs the helper binary for `args`, whose first element is the program
/// name.
pub fn run_cli<I, T>(args: I) -> Result<(), LaunchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let invocation = cli::parse_invocation(&args)?;
    match invocation.command {
        DaemonCommand::Run => run_daemon(invocation.config_arguments),
        DaemonCommand::Install => install_daemon(invocation.config_arguments),
        DaemonCommand::Uninstall => uninstall_daemon(invocation.config_arguments),
    }
}

#[cfg(test)]
mod tests;
