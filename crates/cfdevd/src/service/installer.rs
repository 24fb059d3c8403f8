//! Installs and removes the helper as a supervised service.

use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use cfdev_config::Config;

use super::{DaemonSpec, PlatformServiceManager, SERVICE_TARGET, ServiceError, ServiceManager};

const EXECUTABLE_MODE: u32 = 0o700;
const DESCRIPTOR_MODE: u32 = 0o644;
const STAGING_SUFFIX: &str = ".partial";

/// Installation operations the helper exposes to its command handlers.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceLifecycle: Send + Sync {
    /// Installs `executable` as the persistent service and starts it.
    fn install(&self, executable: &Utf8Path) -> Result<(), ServiceError>;

    /// Stops the persistent service and removes every installed file.
    fn uninstall(&self) -> Result<(), ServiceError>;
}

/// Writes service files into a supervisor's descriptor directory.
#[derive(Debug, Clone)]
pub struct ServiceInstaller<M> {
    service_dir: Utf8PathBuf,
    manager: M,
}

impl<M> ServiceInstaller<M>
where
    M: ServiceManager,
{
    /// Builds an installer that writes descriptors into `service_dir`.
    pub fn new(service_dir: impl Into<Utf8PathBuf>, manager: M) -> Self {
        Self {
            service_dir: service_dir.into(),
            manager,
        }
    }

    /// Path of the descriptor written for `spec`.
    #[must_use]
    pub fn descriptor_path(&self, spec: &DaemonSpec) -> Utf8PathBuf {
        self.manager.descriptor_path(&self.service_dir, spec.label())
    }

    /// Copies `executable` to `spec.program()`, writes the descriptor,
    /// and registers the service. An existing registration is replaced.
    pub fn install(&self, spec: &DaemonSpec, executable: &Utf8Path) -> Result<(), ServiceError> {
        let descriptor = self.descriptor_path(spec);
        if descriptor.exists()
            && let Err(error) = self.manager.deregister(&descriptor, spec)
        {
            warn!(
                target: SERVICE_TARGET,
                error = %error,
                label = spec.label(),
                "failed to deregister previous installation"
            );
        }

        install_executable(executable, spec.program())?;
        write_descriptor(&descriptor, &self.manager.render_descriptor(spec))?;
        self.manager.register(&descriptor, spec)?;
        info!(
            target: SERVICE_TARGET,
            label = spec.label(),
            program = %spec.program(),
            descriptor = %descriptor,
            "service installed"
        );
        Ok(())
    }

    /// Deregisters the service and removes its descriptor and executable.
    ///
    /// Deregistration is skipped when no descriptor exists, and files that are
    /// already gone are ignored.
    pub fn uninstall(&self, spec: &DaemonSpec) -> Result<(), ServiceError> {
        let descriptor = self.descriptor_path(spec);
        if descriptor.exists() {
            self.manager.deregister(&descriptor, spec)?;
        }
        remove_if_present(&descriptor)?;
        remove_if_present(spec.program())?;
        info!(
            target: SERVICE_TARGET,
            label = spec.label(),
            "service uninstalled"
        );
        Ok(())
    }
}

/// A concrete service: an installer paired with the [`DaemonSpec`] it installs.
#[derive(Debug, Clone)]
pub struct InstalledDaemon<M> {
    installer: ServiceInstaller<M>,
    spec: DaemonSpec,
}

impl<M> InstalledDaemon<M> {
    pub const fn new(installer: ServiceInstaller<M>, spec: DaemonSpec) -> Self {
        Self { installer, spec }
    }

    #[must_use]
    pub const fn spec(&self) -> &DaemonSpec {
        &self.spec
    }
}

impl InstalledDaemon<PlatformServiceManager> {
    /// The helper as the host's native supervisor would run it.
    #[must_use]
    pub fn for_config(config: &Config) -> Self {
        let installer = ServiceInstaller::new(config.service_dir(), PlatformServiceManager::default());
        Self::new(installer, DaemonSpec::from_config(config))
    }
}

impl<M> ServiceLifecycle for InstalledDaemon<M>
where
    M: ServiceManager,
{
    fn install(&self, executable: &Utf8Path) -> Result<(), ServiceError> {
        self.installer.install(&self.spec, executable)
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        self.installer.uninstall(&self.spec)
    }
}

/// Copies through a staging file beside the target so that a running
/// executable is replaced by rename rather than rewritten in place.
fn install_executable(source: &Utf8Path, target: &Utf8Path) -> Result<(), ServiceError> {
    ensure_parent(target)?;
    let staging = Utf8PathBuf::from(format!("{target}{STAGING_SUFFIX}"));
    let copy_error = |source_error| ServiceError::CopyExecutable {
        from: source.to_path_buf(),
        to: target.to_path_buf(),
        source: source_error,
    };

    let result = copy_into(source, &staging).and_then(|()| fs::rename(&staging, target));
    if let Err(error) = result {
        let _ = fs::remove_file(&staging);
        return Err(copy_error(error));
    }
    Ok(())
}

fn copy_into(source: &Utf8Path, staging: &Utf8Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut output = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(EXECUTABLE_MODE)
        .open(staging)?;
    io::copy(&mut input, &mut output)?;
    output.set_permissions(Permissions::from_mode(EXECUTABLE_MODE))?;
    output.sync_all()
}

fn write_descriptor(path: &Utf8Path, contents: &str) -> Result<(), ServiceError> {
    ensure_parent(path)?;
    let write = || -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(DESCRIPTOR_MODE)
            .open(path)?;
        file.write_all(contents.as_bytes())?;
        file.set_permissions(Permissions::from_mode(DESCRIPTOR_MODE))?;
        file.sync_all()
    };
    write().map_err(|source| ServiceError::WriteDescriptor {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent(path: &Utf8Path) -> Result<(), ServiceError> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(parent).map_err(|source| ServiceError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })
}

fn remove_if_present(path: &Utf8Path) -> Result<(), ServiceError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ServiceError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
