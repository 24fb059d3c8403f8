//! Tests for the socket listener.

use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::listener::SocketListener;
use super::{BlockingHandler, ConnectionHandler, CountingHandler, ListenerError};

struct SocketDir {
    _dir: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn socket_dir() -> SocketDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("cfdevd.socket")).expect("utf8 path");
    SocketDir { _dir: dir, path }
}

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[rstest]
fn accepts_connections(socket_dir: SocketDir) {
    let listener = SocketListener::bind(&socket_dir.path).expect("bind listener");
    let (count, handler) = CountingHandler::new();
    let handler: Arc<dyn ConnectionHandler> = handler;
    let handle = listener.start(handler).expect("start listener");

    UnixStream::connect(&socket_dir.path).expect("connect first client");
    UnixStream::connect(&socket_dir.path).expect("connect second client");

    assert!(wait_for_count(&count, 2), "expected two connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn socket_is_world_accessible(socket_dir: SocketDir) {
    let listener = SocketListener::bind(&socket_dir.path).expect("bind listener");
    let metadata = std::fs::metadata(&socket_dir.path).expect("socket metadata");
    assert!(metadata.file_type().is_socket());
    assert_eq!(metadata.permissions().mode() & 0o777, 0o666);
    drop(listener);
}

#[rstest]
fn cleans_stale_socket_files(socket_dir: SocketDir) {
    {
        let _stale = UnixListener::bind(&socket_dir.path).expect("bind stale listener");
    }
    assert!(socket_dir.path.exists(), "stale socket should remain");

    let listener = SocketListener::bind(&socket_dir.path).expect("bind new listener");
    let (_, handler) = CountingHandler::new();
    let handle = listener.start(handler).expect("start listener");

    UnixStream::connect(&socket_dir.path).expect("connect unix client");

    handle.shutdown();
    handle.join().expect("join listener");
    assert!(
        !socket_dir.path.exists(),
        "listener should remove unix socket on shutdown"
    );
}

#[rstest]
fn rejects_in_use_socket(socket_dir: SocketDir) {
    let _existing = UnixListener::bind(&socket_dir.path).expect("bind existing listener");

    let error = SocketListener::bind(&socket_dir.path).expect_err("should fail bind");
    assert!(matches!(error, ListenerError::InUse { .. }));
}

#[rstest]
fn refuses_to_replace_regular_files(socket_dir: SocketDir) {
    std::fs::write(&socket_dir.path, b"not a socket").expect("write regular file");

    let error = SocketListener::bind(&socket_dir.path).expect_err("should fail bind");
    assert!(matches!(error, ListenerError::NotSocket { .. }));
    assert!(socket_dir.path.exists(), "regular file must be left alone");
}

#[rstest]
fn shutdown_waits_for_in_flight_handlers(socket_dir: SocketDir) {
    let listener = SocketListener::bind(&socket_dir.path).expect("bind listener");
    let (completed, handler) = BlockingHandler::new();
    let handle = listener.start(handler).expect("start listener");

    let client = UnixStream::connect(&socket_dir.path).expect("connect client");
    thread::sleep(Duration::from_millis(100));
    handle.shutdown();

    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        drop(client);
    });
    handle.join().expect("join listener");
    closer.join().expect("join closer");

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert!(!socket_dir.path.exists(), "socket should be removed");
}
