//! Supervisor abstraction used by the installer.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use super::{DaemonSpec, ServiceError};

/// Host service supervisor that persists and starts the helper.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceManager: Send + Sync {
    /// Location of the descriptor for `label` within `service_dir`.
    fn descriptor_path(&self, service_dir: &Utf8Path, label: &str) -> Utf8PathBuf;

    /// Renders the descriptor contents for `spec`.
    fn render_descriptor(&self, spec: &DaemonSpec) -> String;

    /// Registers the written descriptor and starts the service.
    fn register(&self, descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError>;

    /// Stops the service and removes it from the supervisor.
    fn deregister(&self, descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError>;
}

impl<T> ServiceManager for Arc<T>
where
    T: ServiceManager,
{
    fn descriptor_path(&self, service_dir: &Utf8Path, label: &str) -> Utf8PathBuf {
        (**self).descriptor_path(service_dir, label)
    }

    fn render_descriptor(&self, spec: &DaemonSpec) -> String {
        (**self).render_descriptor(spec)
    }

    fn register(&self, descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError> {
        (**self).register(descriptor, spec)
    }

    fn deregister(&self, descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError> {
        (**self).deregister(descriptor, spec)
    }
}

/// Supervisor native to the build target.
#[cfg(target_os = "macos")]
pub type PlatformServiceManager = super::Launchd;

/// Supervisor native to the build target.
#[cfg(not(target_os = "macos"))]
pub type PlatformServiceManager = super::Systemd;
