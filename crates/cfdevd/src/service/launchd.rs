//! launchd property-list descriptors and `launchctl` registration.

use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};

use crate::host_command;

use super::{DaemonSpec, ServiceError, ServiceManager};

const PLIST_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
    "<dict>\n",
);
const PLIST_FOOTER: &str = "</dict>\n</plist>\n";

/// Supervisor backed by launchd.
#[derive(Debug, Default, Clone, Copy)]
pub struct Launchd;

impl ServiceManager for Launchd {
    fn descriptor_path(&self, service_dir: &Utf8Path, label: &str) -> Utf8PathBuf {
        service_dir.join(format!("{label}.plist"))
    }

    fn render_descriptor(&self, spec: &DaemonSpec) -> String {
        let mut plist = String::from(PLIST_HEADER);
        push_string_entry(&mut plist, "Label", spec.label());
        push_string_entry(&mut plist, "Program", spec.program().as_str());
        plist.push_str("  <key>ProgramArguments</key>\n  <array>\n");
        for argument in spec.program_arguments() {
            let _ = writeln!(plist, "    <string>{}</string>", escape_xml(argument));
        }
        plist.push_str("  </array>\n");
        let _ = writeln!(
            plist,
            "  <key>RunAtLoad</key>\n  <{}/>",
            spec.run_at_load()
        );
        push_string_entry(&mut plist, "StandardOutPath", spec.stdout_path().as_str());
        push_string_entry(&mut plist, "StandardErrorPath", spec.stderr_path().as_str());
        plist.push_str(PLIST_FOOTER);
        plist
    }

    fn register(&self, descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError> {
        host_command::run("launchctl", &["load", "-w", descriptor.as_str()]).map_err(|source| {
            ServiceError::Register {
                label: spec.label().to_owned(),
                source,
            }
        })
    }

    fn deregister(&self, descriptor: &Utf8Path, spec: &DaemonSpec) -> Result<(), ServiceError> {
        // Unloading the running helper sends it SIGTERM; the uninstall reply
        // only reaches the client if this returns within the drain window.
        host_command::run("launchctl", &["unload", descriptor.as_str()]).map_err(|source| {
            ServiceError::Deregister {
                label: spec.label().to_owned(),
                source,
            }
        })
    }
}

fn push_string_entry(plist: &mut String, key: &str, value: &str) {
    let _ = writeln!(
        plist,
        "  <key>{key}</key>\n  <string>{}</string>",
        escape_xml(value)
    );
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
