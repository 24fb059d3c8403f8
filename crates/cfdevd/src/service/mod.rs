//! Persistent service registration for the helper.
//!
//! The helper runs as a root-owned service supervised by the host: launchd on
//! macOS and systemd elsewhere. [`ServiceInstaller`] copies the executable into
//! place, writes the supervisor's descriptor, and registers it; uninstalling
//! reverses each step and tolerates steps that were never taken.

mod errors;
mod installer;
mod launchd;
mod manager;
mod spec;
mod systemd;

pub use self::errors::ServiceError;
pub use self::installer::{InstalledDaemon, ServiceInstaller, ServiceLifecycle};
pub use self::launchd::Launchd;
pub use self::manager::{PlatformServiceManager, ServiceManager};
pub use self::spec::DaemonSpec;
pub use self::systemd::Systemd;

#[cfg(test)]
pub(crate) use self::installer::MockServiceLifecycle;
#[cfg(test)]
pub(crate) use self::manager::MockServiceManager;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");
