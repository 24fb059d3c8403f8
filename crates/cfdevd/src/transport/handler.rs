//! Connection handling abstractions for the helper listener.

use std::io::{self, IoSlice, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::net::UnixStream;

use nix::errno::Errno;
use nix::sys::socket::{ControlMessage, MsgFlags, sendmsg};

/// Stream accepted by the helper listener.
///
/// Besides plain reads and writes, the stream can pass an open file
/// descriptor to the peer as `SCM_RIGHTS` ancillary data.
#[derive(Debug)]
pub(crate) struct ConnectionStream {
    inner: UnixStream,
}

impl ConnectionStream {
    pub(crate) const fn new(inner: UnixStream) -> Self {
        Self { inner }
    }

    /// Writes `frame` with `fd` attached as ancillary data.
    ///
    /// The descriptor travels with the first chunk of data that the kernel
    /// accepts. Any remainder of `frame` is written without ancillary data.
    /// The caller retains ownership of `fd` and must close its own copy.
    pub(crate) fn send_with_fd(&mut self, frame: &[u8], fd: BorrowedFd<'_>) -> io::Result<()> {
        let fds = [fd.as_raw_fd()];
        let control = [ControlMessage::ScmRights(&fds)];
        let iov = [IoSlice::new(frame)];
        let sent = loop {
            match sendmsg::<()>(
                self.inner.as_raw_fd(),
                &iov,
                &control,
                MsgFlags::empty(),
                None,
            ) {
                Ok(sent) => break sent,
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(io::Error::from(errno)),
            }
        };
        if sent == 0 && !frame.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "peer accepted no bytes alongside the descriptor",
            ));
        }
        if let Some(rest) = frame.get(sent..)
            && !rest.is_empty()
        {
            self.inner.write_all(rest)?;
        }
        self.inner.flush()
    }
}

impl AsFd for ConnectionStream {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inner.as_fd()
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}
