//! systemd unit files and `systemctl` registration.

use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};

use crate::host_command;

use super::{DaemonSpec, ServiceError, ServiceManager};

/// Supervisor backed by systemd.
#[derive(Debug, Default, Clone, Copy)]
pub struct Systemd;

impl Systemd {
    fn unit_name(spec: &DaemonSpec) -> String {
        format!("{}.service", spec.label())
    }
}

impl ServiceManager for Systemd {
    fn descriptor_path(&self, service_dir: &Utf8Path, label: &str) -> Utf8PathBuf {
        service_dir.join(format!("{label}.service"))
    }

    fn render_descriptor(&self, spec: &DaemonSpec) -> String {
        let exec_start = spec
            .program_arguments()
            .iter()
            .map(|argument| quote_argument(argument))
            .collect::<Vec<_>>()
            .join(" ");
        let mut unit = String::new();
        let _ = writeln!(unit, "[Unit]");
        let _ = writeln!(unit, "Description=CF Dev privileged helper ({})", spec.label());
        let _ = writeln!(unit);
        let _ = writeln!(unit, "[Service]");
        let _ = writeln!(unit, "Type=simple");
        let _ = writeln!(unit, "ExecStart={exec_start}");
        let _ = writeln!(unit, "Restart=on-failure");
        let _ = writeln!(unit, "StandardOutput=append:{}", spec.stdout_path());
        let _ = writeln!(unit, "StandardError=append:{}", spec.stderr_path());
        if spec.run_at_load() {
            let _ = writeln!(unit);
            let _ = writeln!(unit, "[Install]");
            let _ = writeln!(unit, "WantedBy=multi-user.target");
        }
        unit
    }

    fn register(&self, _descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError> {
        let register_error = |source| ServiceError::Register {
            label: spec.label().to_owned(),
            source,
        };
        host_command::run("systemctl", &["daemon-reload"]).map_err(register_error)?;
        let unit = Self::unit_name(spec);
        let started = if spec.run_at_load() {
            host_command::run("systemctl", &["enable", "--now", unit.as_str()])
        } else {
            host_command::run("systemctl", &["start", unit.as_str()])
        };
        started.map_err(register_error)
    }

    fn deregister(&self, _descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError> {
        // The helper may be deregistering itself; waiting for the stop job
        // would block on this very process exiting.
        let unit = Self::unit_name(spec);
        host_command::run("systemctl", &["disable", "--now", "--no-block", unit.as_str()])
            .map_err(|source| ServiceError::Deregister {
                label: spec.label().to_owned(),
                source,
            })
    }
}

fn quote_argument(argument: &str) -> String {
    if !argument.is_empty()
        && argument
            .chars()
            .all(|character| !character.is_whitespace() && !matches!(character, '"' | '\\'))
    {
        return argument.to_owned();
    }
    let escaped = argument.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
