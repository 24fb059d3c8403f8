//! Socket plumbing shared by every client request.
//!
//! Each request opens its own connection, performs the handshake, and then
//! exchanges exactly one command and reply.

use std::io::{self, IoSliceMut, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use camino::Utf8Path;
use nix::errno::Errno;
use nix::sys::socket::{ControlMessageOwned, MsgFlags, recvmsg};
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{debug, warn};

use cfdev_protocol::{HANDSHAKE_LEN, Handshake, PROTOCOL_VERSION};

use crate::{CLIENT_TARGET, ClientError};

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Dials the helper socket, giving up after [`CONNECTION_TIMEOUT`].
pub(crate) fn connect(path: &Utf8Path) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECTION_TIMEOUT)?;
    Ok(socket.into())
}

/// Sends the client handshake and validates the helper's answer.
///
/// A version mismatch is logged and tolerated. A peer that does not present
/// the helper's identity is refused.
pub(crate) fn handshake<S: Read + Write>(stream: &mut S) -> Result<Handshake, ClientError> {
    stream
        .write_all(&Handshake::client().encode())
        .map_err(ClientError::SendHandshake)?;
    let mut frame = [0_u8; HANDSHAKE_LEN];
    stream
        .read_exact(&mut frame)
        .map_err(ClientError::ReadHandshake)?;
    let reply = Handshake::decode(&frame)?;
    if !reply.is_server() {
        return Err(ClientError::ForeignPeer {
            identity: String::from_utf8_lossy(&reply.identity()).into_owned(),
        });
    }
    if !reply.version_matches() {
        warn!(
            target: CLIENT_TARGET,
            expected = PROTOCOL_VERSION,
            actual = reply.version(),
            "helper speaks a different protocol version"
        );
    }
    debug!(target: CLIENT_TARGET, version = reply.version(), "handshake complete");
    Ok(reply)
}

/// Reads into `frame` and collects an `SCM_RIGHTS` descriptor if one arrives.
///
/// Returns the number of bytes read by the single underlying `recvmsg` call.
/// Descriptors beyond the first are closed.
pub(crate) fn receive_with_fd(
    stream: &UnixStream,
    frame: &mut [u8],
) -> io::Result<(usize, Option<OwnedFd>)> {
    let mut iov = [IoSliceMut::new(frame)];
    let mut space = nix::cmsg_space!([RawFd; 1]);
    let message = loop {
        match recvmsg::<()>(
            stream.as_raw_fd(),
            &mut iov,
            Some(&mut space),
            MsgFlags::empty(),
        ) {
            Ok(message) => break message,
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(io::Error::from(errno)),
        }
    };

    let mut received = Vec::new();
    for cmsg in message.cmsgs() {
        if let ControlMessageOwned::ScmRights(fds) = cmsg {
            // SAFETY: the kernel installed these descriptors into this process
            // during `recvmsg`; nothing else holds them yet.
            received.extend(fds.into_iter().map(|raw| unsafe { OwnedFd::from_raw_fd(raw) }));
        }
    }
    let bytes = message.bytes;
    let mut descriptors = received.into_iter();
    Ok((bytes, descriptors.next()))
}
