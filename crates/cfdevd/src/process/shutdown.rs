//! Termination signals that end the serve loop.
//!
//! launchd and systemd stop the helper with `SIGTERM`; the remaining signals
//! cover foreground runs from a terminal.

use std::ffi::c_int;
use std::fmt;
use std::io;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

const TERMINATION_SIGNALS: [c_int; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Source of the "stop serving" notification.
pub trait ShutdownSignal: Send + Sync {
    /// Starts capturing stop requests. Called before the socket is bound so a
    /// request arriving during startup still runs the shutdown path.
    fn arm(&self) -> Result<(), ShutdownError>;

    /// Blocks until the helper should stop accepting connections.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported while waiting for a stop request.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Signal handlers could not be registered.
    #[error("failed to register termination signal handlers: {source}")]
    Register {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for the supervisor or an operator to stop the helper.
pub struct SystemShutdownSignal {
    drain_budget: Duration,
    signals: Mutex<Option<Signals>>,
}

impl SystemShutdownSignal {
    /// `drain_budget` is how long in-flight handlers get once a signal
    /// arrives; it is logged so operators know how long the stop may take.
    #[must_use]
    pub const fn new(drain_budget: Duration) -> Self {
        Self {
            drain_budget,
            signals: Mutex::new(None),
        }
    }

    fn is_armed(&self) -> bool {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for SystemShutdownSignal {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SystemShutdownSignal")
            .field("drain_budget", &self.drain_budget)
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn arm(&self) -> Result<(), ShutdownError> {
        let mut slot = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            let signals = Signals::new(TERMINATION_SIGNALS)
                .map_err(|source| ShutdownError::Register { source })?;
            *slot = Some(signals);
        }
        Ok(())
    }

    fn wait(&self) -> Result<(), ShutdownError> {
        self.arm()?;
        let taken = self
            .signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut signals) = taken else {
            return Ok(());
        };
        let received = signals.forever().next();
        info!(
            target: PROCESS_TARGET,
            signal = received.map_or("none", signal_name),
            drain_budget_secs = self.drain_budget.as_secs(),
            "stopping helper"
        );
        Ok(())
    }
}

const fn signal_name(signal: c_int) -> &'static str {
    match signal {
        SIGTERM => "SIGTERM",
        SIGINT => "SIGINT",
        SIGQUIT => "SIGQUIT",
        SIGHUP => "SIGHUP",
        _ => "unknown",
    }
}
