//! Recording doubles for the helper's privileged collaborators.

use std::io;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};

use crate::host_command::HostCommandError;
use crate::network::{AliasError, LoopbackAliases};
use crate::service::{DaemonSpec, Launchd, ServiceError, ServiceLifecycle, ServiceManager};

fn denied(program: &str) -> HostCommandError {
    HostCommandError::Spawn {
        program: program.to_owned(),
        source: io::Error::from(io::ErrorKind::PermissionDenied),
    }
}

/// Alias operation observed by [`RecordingAliases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasCall {
    Add(Vec<Ipv4Addr>),
    Remove(Vec<Ipv4Addr>),
}

/// Loopback alias double that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingAliases {
    calls: Mutex<Vec<AliasCall>>,
    fail: AtomicBool,
}

impl RecordingAliases {
    pub fn fail_from_now_on(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<AliasCall> {
        self.calls.lock().expect("alias mutex poisoned").clone()
    }

    fn record(&self, call: AliasCall) {
        self.calls.lock().expect("alias mutex poisoned").push(call);
    }

    fn failing(&self) -> bool {
        self.fail.load(Ordering::SeqCst)
    }
}

impl LoopbackAliases for RecordingAliases {
    fn add_aliases(&self, addresses: &[Ipv4Addr]) -> Result<(), AliasError> {
        self.record(AliasCall::Add(addresses.to_vec()));
        match addresses.first() {
            Some(&address) if self.failing() => Err(AliasError::Add {
                address,
                source: denied("ifconfig"),
            }),
            _ => Ok(()),
        }
    }

    fn remove_aliases(&self, addresses: &[Ipv4Addr]) -> Result<(), AliasError> {
        self.record(AliasCall::Remove(addresses.to_vec()));
        match addresses.first() {
            Some(&address) if self.failing() => Err(AliasError::Remove {
                address,
                source: denied("ifconfig"),
            }),
            _ => Ok(()),
        }
    }
}

/// Lifecycle double that counts uninstall requests.
#[derive(Debug, Default)]
pub struct RecordingLifecycle {
    uninstalls: AtomicUsize,
}

impl RecordingLifecycle {
    pub fn uninstalls(&self) -> usize {
        self.uninstalls.load(Ordering::SeqCst)
    }
}

impl ServiceLifecycle for RecordingLifecycle {
    fn install(&self, _executable: &Utf8Path) -> Result<(), ServiceError> {
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Supervisor double that renders launchd descriptors and records
/// registration calls instead of running `launchctl`.
#[derive(Debug, Default)]
pub struct RecordingSupervisor {
    registered: Mutex<Vec<Utf8PathBuf>>,
    deregistered: Mutex<Vec<Utf8PathBuf>>,
}

impl RecordingSupervisor {
    pub fn registered(&self) -> Vec<Utf8PathBuf> {
        self.registered.lock().expect("supervisor mutex poisoned").clone()
    }

    pub fn deregistered(&self) -> Vec<Utf8PathBuf> {
        self.deregistered
            .lock()
            .expect("supervisor mutex poisoned")
            .clone()
    }
}

impl ServiceManager for RecordingSupervisor {
    fn descriptor_path(&self, service_dir: &Utf8Path, label: &str) -> Utf8PathBuf {
        Launchd.descriptor_path(service_dir, label)
    }

    fn render_descriptor(&self, spec: &DaemonSpec) -> String {
        Launchd.render_descriptor(spec)
    }

    fn register(&self, descriptor: &Utf8Path, _spec: &DaemonSpec) -> Result<(), ServiceError> {
        self.registered
            .lock()
            .expect("supervisor mutex poisoned")
            .push(descriptor.to_path_buf());
        Ok(())
    }

    fn deregister(&self, descriptor: &Utf8Path, _spec: &DaemonSpec) -> Result<(), ServiceError> {
        self.deregistered
            .lock()
            .expect("supervisor mutex poisoned")
            .push(descriptor.to_path_buf());
        Ok(())
    }
}
