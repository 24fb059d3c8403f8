//! Minimal protocol client used to drive the helper from tests.

use std::io::{self, IoSliceMut, Read, Write};
use std::net::{SocketAddrV4, TcpListener};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use camino::Utf8Path;
use nix::sys::socket::{ControlMessageOwned, MsgFlags, recvmsg};

use cfdev_protocol::{BIND_REPLY_LEN, BindRequest, Command, HANDSHAKE_LEN, Handshake};

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind reply frame and the listener that accompanied it, if any.
pub struct BindReply {
    pub frame: [u8; BIND_REPLY_LEN],
    pub listener: Option<TcpListener>,
}

/// A single connection to the helper.
pub struct ProtocolClient {
    stream: UnixStream,
}

impl ProtocolClient {
    pub fn connect(socket: &Utf8Path) -> Self {
        let stream = UnixStream::connect(socket).expect("connect to helper socket");
        stream
            .set_read_timeout(Some(IO_TIMEOUT))
            .expect("set read timeout");
        Self { stream }
    }

    /// Sends the client handshake and returns the helper's answer.
    pub fn handshake(&mut self) -> Handshake {
        self.send(&Handshake::client().encode());
        let mut frame = [0_u8; HANDSHAKE_LEN];
        self.stream
            .read_exact(&mut frame)
            .expect("read server handshake");
        Handshake::decode(&frame).expect("decode server handshake")
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).expect("write to helper");
    }

    /// Runs a handshake and sends `command`.
    pub fn issue(socket: &Utf8Path, command: Command) -> Self {
        let mut client = Self::connect(socket);
        client.handshake();
        client.send(&command.encode());
        client
    }

    /// Reads everything the helper writes until it closes the connection.
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let mut remaining = Vec::new();
        self.stream
            .read_to_end(&mut remaining)
            .expect("read until close");
        remaining
    }

    /// Requests a listener on `address` and collects the reply.
    pub fn bind(socket: &Utf8Path, address: SocketAddrV4) -> BindReply {
        let mut client = Self::issue(socket, Command::Bind(BindRequest::from(address)));
        client.receive_bind_reply()
    }

    fn receive_bind_reply(&mut self) -> BindReply {
        let mut frame = [0_u8; BIND_REPLY_LEN];
        let (received, fd) = self.receive_with_fd(&mut frame);
        if let Some(rest) = frame.get_mut(received..) {
            self.stream.read_exact(rest).expect("read rest of bind reply");
        }
        BindReply {
            frame,
            listener: fd.map(TcpListener::from),
        }
    }

    fn receive_with_fd(&self, buf: &mut [u8]) -> (usize, Option<OwnedFd>) {
        let mut iov = [IoSliceMut::new(buf)];
        let mut space = nix::cmsg_space!([RawFd; 1]);
        let message = recvmsg::<()>(
            self.stream.as_raw_fd(),
            &mut iov,
            Some(&mut space),
            MsgFlags::empty(),
        )
        .map_err(io::Error::from)
        .expect("receive bind reply");
        let mut fd = None;
        for cmsg in message.cmsgs() {
            if let ControlMessageOwned::ScmRights(fds) = cmsg {
                fd = fds
                    .first()
                    .map(|raw| unsafe { OwnedFd::from_raw_fd(*raw) });
            }
        }
        (message.bytes, fd)
    }
}
