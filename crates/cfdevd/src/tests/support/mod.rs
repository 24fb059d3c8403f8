//! Shared doubles and harnesses for the helper test suites.

mod client;
mod helper;
mod reporter;
mod services;

pub use client::{BindReply, ProtocolClient};
pub use helper::RunningHelper;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use services::{AliasCall, RecordingAliases, RecordingLifecycle, RecordingSupervisor};

use camino::Utf8PathBuf;
use tempfile::TempDir;

/// Temporary directory paired with its UTF-8 path.
pub struct Scratch {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temporary directory");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is not UTF-8");
        Self { _dir: dir, root }
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}
