//! Runs the helper's listener and dispatcher against a temporary socket.

use std::net::Ipv4Addr;
use std::sync::Arc;

use camino::Utf8PathBuf;

use crate::dispatch::{CommandConnectionHandler, DaemonServices};
use crate::network::LoopbackAliases;
use crate::service::ServiceLifecycle;
use crate::transport::{ListenerHandle, SocketListener};

use super::{RecordingAliases, RecordingLifecycle, Scratch};

pub const DIRECTOR_IP: Ipv4Addr = Ipv4Addr::new(10, 245, 0, 2);
pub const ROUTER_IP: Ipv4Addr = Ipv4Addr::new(10, 144, 0, 34);

/// A serving helper whose socket lives in a temporary directory.
pub struct RunningHelper {
    _scratch: Scratch,
    socket: Utf8PathBuf,
    pub aliases: Arc<RecordingAliases>,
    pub lifecycle: Arc<RecordingLifecycle>,
    handle: Option<ListenerHandle>,
}

impl RunningHelper {
    /// Starts a helper backed by recording doubles.
    pub fn start() -> Self {
        let aliases = Arc::new(RecordingAliases::default());
        let lifecycle = Arc::new(RecordingLifecycle::default());
        Self::start_with(
            Arc::clone(&aliases) as Arc<dyn LoopbackAliases>,
            Arc::clone(&lifecycle) as Arc<dyn ServiceLifecycle>,
            aliases,
            lifecycle,
        )
    }

    /// Starts a helper whose uninstall command drives `lifecycle`.
    pub fn start_with_lifecycle(lifecycle: Arc<dyn ServiceLifecycle>) -> Self {
        let aliases = Arc::new(RecordingAliases::default());
        Self::start_with(
            Arc::clone(&aliases) as Arc<dyn LoopbackAliases>,
            lifecycle,
            aliases,
            Arc::new(RecordingLifecycle::default()),
        )
    }

    fn start_with(
        aliases_service: Arc<dyn LoopbackAliases>,
        lifecycle_service: Arc<dyn ServiceLifecycle>,
        aliases: Arc<RecordingAliases>,
        lifecycle: Arc<RecordingLifecycle>,
    ) -> Self {
        let scratch = Scratch::new();
        let socket = scratch.path("cfdevd.socket");
        let services =
            DaemonServices::new(aliases_service, lifecycle_service, [DIRECTOR_IP, ROUTER_IP]);
        let listener = SocketListener::bind(&socket).expect("bind helper socket");
        let handle = listener
            .start(Arc::new(CommandConnectionHandler::new(services)))
            .expect("start helper listener");
        Self {
            _scratch: scratch,
            socket,
            aliases,
            lifecycle,
            handle: Some(handle),
        }
    }

    pub fn socket(&self) -> &camino::Utf8Path {
        &self.socket
    }

    /// Stops accepting, drains handlers, and removes the socket.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown();
            handle.join().expect("join helper listener");
        }
    }
}

impl Drop for RunningHelper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown();
            let _ = handle.join();
        }
    }
}
