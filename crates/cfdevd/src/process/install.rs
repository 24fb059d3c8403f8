//! `install` and `uninstall` entry points.

use std::env;
use std::ffi::OsString;

use camino::Utf8PathBuf;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader};
use crate::service::{InstalledDaemon, ServiceLifecycle};
use crate::telemetry;

use super::errors::LaunchError;

/// Installs the running executable as the persistent helper service.
pub fn install_daemon(config_args: Vec<OsString>) -> Result<(), LaunchError> {
    let loader = SystemConfigLoader::new(config_args);
    let lifecycle = prepare(&loader)?;
    let executable = current_executable()?;
    lifecycle.install(&executable)?;
    Ok(())
}

/// Stops and removes the persistent helper service.
pub fn uninstall_daemon(config_args: Vec<OsString>) -> Result<(), LaunchError> {
    let loader = SystemConfigLoader::new(config_args);
    let lifecycle = prepare(&loader)?;
    lifecycle.uninstall()?;
    Ok(())
}

fn prepare(loader: &dyn ConfigLoader) -> Result<impl ServiceLifecycle + use<>, LaunchError> {
    let config = loader.load()?;
    telemetry::initialise(&config)?;
    Ok(InstalledDaemon::for_config(&config))
}

fn current_executable() -> Result<Utf8PathBuf, LaunchError> {
    let path = env::current_exe().map_err(|source| LaunchError::CurrentExecutable { source })?;
    Utf8PathBuf::from_path_buf(path).map_err(|path| LaunchError::NonUtf8Executable { path })
}
