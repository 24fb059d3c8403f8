//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use camino::Utf8Path;

use cfdev_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Lifecycle events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerStarted(String),
    ShutdownRequested,
    ShutdownCompleted,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_started(&self, socket: &Utf8Path) {
        self.record(HealthEvent::ListenerStarted(socket.to_string()));
    }

    fn shutdown_requested(&self) {
        self.record(HealthEvent::ShutdownRequested);
    }

    fn shutdown_completed(&self) {
        self.record(HealthEvent::ShutdownCompleted);
    }
}
