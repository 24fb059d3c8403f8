//! Listener implementation for the helper's Unix socket.

use std::fs::{self, Permissions};
use std::io;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
/// Upper bound on how long shutdown waits for in-flight handlers.
pub(crate) const HANDLER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
/// Any local user may connect; authority is the socket path itself.
const SOCKET_MODE: u32 = 0o666;

/// Listener bound to the helper's Unix socket path.
#[derive(Debug)]
pub(crate) struct SocketListener {
    path: Utf8PathBuf,
    listener: UnixListener,
}

impl SocketListener {
    /// Binds the socket, replacing a stale socket file left by a dead
    /// process, and opens its permissions to every local user.
    pub(crate) fn bind(path: &Utf8Path) -> Result<Self, ListenerError> {
        let listener = bind_unix(path)?;
        if let Err(source) = fs::set_permissions(path, Permissions::from_mode(SOCKET_MODE)) {
            cleanup_unix_socket(path);
            return Err(ListenerError::Permissions {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            listener,
        })
    }

    pub(crate) fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        if let Err(source) = self.listener.set_nonblocking(true) {
            cleanup_unix_socket(&self.path);
            return Err(ListenerError::NonBlocking { source });
        }
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || run_accept_loop(&self, &shutdown_flag, &handler));
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background listener thread.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to exit. The loop removes the socket file
    /// and drains in-flight handlers before it returns.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| ListenerError::ThreadPanic)
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        path = %listener.path,
        "socket listener active"
    );
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept_connection(&listener.listener) {
            Ok(Some(stream)) => {
                last_error = None;
                in_flight.retain(|handle| !handle.is_finished());
                let handler = Arc::clone(handler);
                in_flight.push(thread::spawn(move || handler.handle(stream)));
            }
            Ok(None) => thread::sleep(ACCEPT_BACKOFF),
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    cleanup_unix_socket(&listener.path);
    drain_handlers(in_flight, HANDLER_DRAIN_TIMEOUT);
}

fn accept_connection(listener: &UnixListener) -> io::Result<Option<ConnectionStream>> {
    match listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            Ok(Some(ConnectionStream::new(stream)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

/// Joins finished handlers until none remain or `timeout` elapses.
///
/// Handlers still running at the deadline are detached; they hold their own
/// connection and finish or fail independently of the listener.
fn drain_handlers(mut in_flight: Vec<JoinHandle<()>>, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        let (finished, pending): (Vec<_>, Vec<_>) = in_flight
            .into_iter()
            .partition(JoinHandle::is_finished);
        for handle in finished {
            if handle.join().is_err() {
                warn!(target: LISTENER_TARGET, "connection handler panicked");
            }
        }
        if pending.is_empty() {
            debug!(target: LISTENER_TARGET, "in-flight handlers drained");
            return;
        }
        if Instant::now() >= deadline {
            warn!(
                target: LISTENER_TARGET,
                pending = pending.len(),
                "abandoning connection handlers still running at shutdown"
            );
            return;
        }
        in_flight = pending;
        thread::sleep(ACCEPT_BACKOFF);
    }
}

fn bind_unix(path: &Utf8Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        remove_stale_socket(path)?;
    }

    UnixListener::bind(path).map_err(|source| ListenerError::Bind {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_stale_socket(path: &Utf8Path) -> Result<(), ListenerError> {
    let metadata = fs::symlink_metadata(path).map_err(|source| ListenerError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotSocket {
            path: path.to_path_buf(),
        });
    }

    match UnixStream::connect(path) {
        Ok(_) => Err(ListenerError::InUse {
            path: path.to_path_buf(),
        }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            debug!(
                target: LISTENER_TARGET,
                path = %path,
                "removing stale unix socket"
            );
            fs::remove_file(path).map_err(|source| ListenerError::Cleanup {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(ListenerError::Connect {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn cleanup_unix_socket(path: &Utf8Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}
