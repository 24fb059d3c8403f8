//! Detecting and installing the privileged helper from the unprivileged side.

use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::process::{Command, Stdio};

use camino::Utf8Path;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::{CLIENT_TARGET, InstallationError, transport};

const SUDO: &str = "sudo";

/// Whether the helper at `program` is the expected build and is serving on
/// `socket`.
///
/// The installed binary's SHA-256 digest must equal `expected_sha256`
/// (lowercase hex) and the socket must accept a connection. Any failure is
/// logged at debug level and reported as "not installed".
#[must_use]
pub fn is_installed(socket: &Utf8Path, program: &Utf8Path, expected_sha256: &str) -> bool {
    match file_sha256(program) {
        Ok(digest) if digest.eq_ignore_ascii_case(expected_sha256) => {}
        Ok(digest) => {
            debug!(
                target: CLIENT_TARGET,
                program = %program,
                expected = expected_sha256,
                actual = %digest,
                "installed helper digest differs"
            );
            return false;
        }
        Err(error) => {
            debug!(
                target: CLIENT_TARGET,
                program = %program,
                error = %error,
                "failed to hash installed helper"
            );
            return false;
        }
    }
    match transport::connect(socket) {
        Ok(_stream) => true,
        Err(error) => {
            debug!(
                target: CLIENT_TARGET,
                socket = %socket,
                error = %error,
                "helper socket refused connection"
            );
            false
        }
    }
}

/// Lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns the I/O error raised while opening or reading the file.
pub fn file_sha256(path: &Utf8Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize();
    Ok(digest
        .iter()
        .fold(String::with_capacity(digest.len() * 2), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        }))
}

/// Runs `sudo -S <executable> install` with the caller's terminal attached, so
/// the helper can copy itself into place and register with the supervisor.
///
/// # Errors
///
/// Returns [`InstallationError::Spawn`] when `sudo` cannot be started and
/// [`InstallationError::Failed`] when the installer exits unsuccessfully.
pub fn install_with_sudo(executable: &Utf8Path) -> Result<(), InstallationError> {
    info!(
        target: CLIENT_TARGET,
        executable = %executable,
        "installing networking helper (requires root privileges)"
    );
    run_installer(elevated_install_command(executable))
}

fn elevated_install_command(executable: &Utf8Path) -> Command {
    let mut command = Command::new(SUDO);
    command
        .arg("-S")
        .arg(executable.as_std_path())
        .arg("install")
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
}

fn run_installer(mut command: Command) -> Result<(), InstallationError> {
    let status = command.status().map_err(|source| InstallationError::Spawn {
        program: command.get_program().to_string_lossy().into_owned(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(InstallationError::Failed { status })
    }
}
