//! Invocation of host administration tools.
//!
//! Loopback aliasing and service registration both shell out to the tools the
//! operating system ships for those jobs (`ifconfig`, `ip`, `launchctl`,
//! `systemctl`). This module runs them with captured output so failures carry
//! the tool's own diagnostics.

use std::io;
use std::process::{Command, ExitStatus, Output};

use thiserror::Error;
use tracing::debug;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Errors produced when a host tool cannot be run or reports failure.
#[derive(Debug, Error)]
pub enum HostCommandError {
    /// The tool could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Tool that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The tool exited unsuccessfully.
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        /// Full command line, for diagnostics.
        command: String,
        /// Exit status reported by the tool.
        status: ExitStatus,
        /// Trimmed standard error output.
        stderr: String,
    },
}

impl HostCommandError {
    /// Returns the tool's standard error output when it ran and failed.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::Spawn { .. } => None,
        }
    }
}

/// Runs `program` with `args`, succeeding only on a zero exit status.
pub(crate) fn run<S>(program: &str, args: &[S]) -> Result<(), HostCommandError>
where
    S: AsRef<str>,
{
    let command_line = render_command_line(program, args);
    debug!(target: HOST_TARGET, command = %command_line, "running host command");
    let output = Command::new(program)
        .args(args.iter().map(AsRef::as_ref))
        .output()
        .map_err(|source| HostCommandError::Spawn {
            program: program.to_owned(),
            source,
        })?;
    check_output(command_line, &output)
}

fn check_output(command: String, output: &Output) -> Result<(), HostCommandError> {
    if output.status.success() {
        return Ok(());
    }
    Err(HostCommandError::Failed {
        command,
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

fn render_command_line<S>(program: &str, args: &[S]) -> String
where
    S: AsRef<str>,
{
    let mut line = program.to_owned();
    for arg in args {
        line.push(' ');
        line.push_str(arg.as_ref());
    }
    line
}
