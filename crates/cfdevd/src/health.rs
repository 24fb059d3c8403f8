//! Structured health reporting for helper lifecycle events.

use std::sync::Arc;

use camino::Utf8Path;

use cfdev_config::Config;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the socket accepts connections.
    fn listener_started(&self, socket: &Utf8Path);

    /// Invoked when a termination signal arrives.
    fn shutdown_requested(&self);

    /// Invoked after the socket is removed and handlers have drained.
    fn shutdown_completed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_started(&self, socket: &Utf8Path) {
        (**self).listener_started(socket);
    }

    fn shutdown_requested(&self) {
        (**self).shutdown_requested();
    }

    fn shutdown_completed(&self) {
        (**self).shutdown_completed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting helper bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.daemon_socket(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "helper bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "helper bootstrap failed"
        );
    }

    fn listener_started(&self, socket: &Utf8Path) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_started",
            socket = %socket,
            "listening on socket"
        );
    }

    fn shutdown_requested(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_requested",
            "shutdown requested"
        );
    }

    fn shutdown_completed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            "shutdown completed"
        );
    }
}
