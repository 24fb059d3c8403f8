//! Process entry points: serving, installing, and uninstalling.

use std::time::Duration;

mod errors;
mod install;
pub(crate) mod launch;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use install::{install_daemon, uninstall_daemon};
pub use launch::run_daemon;
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const SHUTDOWN_TIMEOUT: Duration = crate::transport::HANDLER_DRAIN_TIMEOUT;
