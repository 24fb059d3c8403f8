//! Runs the helper in the foreground until a termination signal arrives.
//!
//! The host supervisor owns backgrounding and restarts, so the helper never
//! daemonises itself.

use std::ffi::OsString;
use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::{CommandConnectionHandler, DaemonServices};
use crate::health::HealthReporter;
use crate::transport::SocketListener;

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Where command handlers get their privileged collaborators.
pub(crate) enum ServiceSource {
    /// Build host-backed services from the loaded configuration.
    System,
    /// Use the supplied services as-is.
    Provided(DaemonServices),
}

/// Collaborators required to run the helper.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
    pub(crate) services: ServiceSource,
}

/// Runs the helper using the production collaborators.
///
/// `config_args` holds the program name followed by configuration flags.
pub fn run_daemon(config_args: Vec<OsString>) -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        loader: SystemConfigLoader::new(config_args),
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::new(SHUTDOWN_TIMEOUT),
        services: ServiceSource::System,
    };
    run_daemon_with(plan)
}

/// Runs the helper with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
        services,
    } = plan;

    let config = bootstrap_with(&loader, reporter.as_ref())?.into_config();
    let services = match services {
        ServiceSource::System => DaemonServices::system(&config),
        ServiceSource::Provided(services) => services,
    };

    shutdown.arm()?;
    let listener = SocketListener::bind(config.daemon_socket())?;
    let socket = listener.path().to_path_buf();
    let handler = Arc::new(CommandConnectionHandler::new(services));
    let listener_handle = listener.start(handler)?;
    reporter.listener_started(&socket);

    let waited = shutdown.wait();
    reporter.shutdown_requested();
    listener_handle.shutdown();
    listener_handle.join()?;
    reporter.shutdown_completed();
    waited?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
