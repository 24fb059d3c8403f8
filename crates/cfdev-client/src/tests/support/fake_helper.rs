//! Scripted stand-in for the privileged helper.
//!
//! Accepts a single connection on a temporary Unix socket, records what the
//! client sent, and answers according to a [`Script`].

use std::io::{self, IoSlice, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::os::fd::AsRawFd;
use std::os::unix::net::{UnixListener, UnixStream};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use nix::sys::socket::{ControlMessage, MsgFlags, sendmsg};
use tempfile::TempDir;

use cfdev_protocol::{
    BindStatus, CommandCode, HANDSHAKE_LEN, Handshake, IDENTITY_LEN, PADDING_LEN, PROTOCOL_VERSION,
    SERVER_IDENTITY,
};

/// How the fake helper answers the single request it serves.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Writes a one byte status.
    Status(u8),
    /// Binds `127.0.0.1:0` and transfers the listener with a success frame.
    GrantBind,
    /// Answers a bind with a failure frame and no descriptor.
    RefuseBind(BindStatus),
    /// Sends a handshake with a foreign identity and nothing else.
    Foreign([u8; IDENTITY_LEN]),
    /// Closes the connection after reading the command.
    Hangup,
}

/// What the fake helper observed.
#[derive(Debug, Default)]
pub struct Exchange {
    pub handshake: Option<Handshake>,
    pub command: Vec<u8>,
    pub granted: Option<SocketAddr>,
}

impl Exchange {
    pub fn code(&self) -> Option<CommandCode> {
        self.command.first().copied().map(CommandCode::from_byte)
    }
}

pub struct FakeHelper {
    _dir: TempDir,
    socket: Utf8PathBuf,
    handle: Option<thread::JoinHandle<Result<Exchange>>>,
}

impl FakeHelper {
    pub fn spawn(script: Script) -> Result<Self> {
        let dir = tempfile::tempdir().context("temp dir")?;
        let socket = Utf8PathBuf::from_path_buf(dir.path().join("cfdevd.socket"))
            .map_err(|path| anyhow!("non-utf8 temp path {}", path.display()))?;
        let listener = UnixListener::bind(&socket).context("bind fake helper")?;
        listener
            .set_nonblocking(true)
            .context("fake helper nonblocking")?;
        let handle = thread::spawn(move || serve(&listener, script));
        Ok(Self {
            _dir: dir,
            socket,
            handle: Some(handle),
        })
    }

    pub fn socket(&self) -> &Utf8Path {
        &self.socket
    }

    /// Waits for the served exchange.
    pub fn finish(&mut self) -> Result<Exchange> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("fake helper already finished"))?;
        handle
            .join()
            .map_err(|_| anyhow!("fake helper thread panicked"))?
    }
}

fn serve(listener: &UnixListener, script: Script) -> Result<Exchange> {
    let mut stream = accept(listener)?;
    let mut exchange = Exchange::default();

    let mut opening = [0_u8; HANDSHAKE_LEN];
    stream
        .read_exact(&mut opening)
        .context("read client handshake")?;
    exchange.handshake = Some(Handshake::decode(&opening)?);

    let identity = match script {
        Script::Foreign(identity) => identity,
        _ => SERVER_IDENTITY,
    };
    let reply = Handshake::new(identity, PROTOCOL_VERSION, [0; PADDING_LEN]);
    stream
        .write_all(&reply.encode())
        .context("write helper handshake")?;

    exchange.command = read_command(&mut stream)?;
    match script {
        Script::Status(status) => stream.write_all(&[status]).context("write status")?,
        Script::GrantBind => exchange.granted = Some(grant_bind(&stream)?),
        Script::RefuseBind(status) => stream
            .write_all(&status.encode())
            .context("write bind refusal")?,
        Script::Foreign(_) | Script::Hangup => {}
    }
    Ok(exchange)
}

fn accept(listener: &UnixListener) -> Result<UnixStream> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).context("blocking stream")?;
                return Ok(stream);
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(error) => return Err(error).context("accept client"),
        }
    }
}

fn read_command(stream: &mut UnixStream) -> Result<Vec<u8>> {
    let mut code = [0_u8; 1];
    match stream.read_exact(&mut code) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(Vec::new()),
        Err(error) => return Err(error).context("read command code"),
    }
    let [byte] = code;
    let mut payload = vec![0_u8; CommandCode::from_byte(byte).payload_len()];
    stream
        .read_exact(&mut payload)
        .context("read command payload")?;
    let mut command = vec![byte];
    command.extend(payload);
    Ok(command)
}

fn grant_bind(stream: &UnixStream) -> Result<SocketAddr> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind granted listener")?;
    let address = listener.local_addr().context("granted address")?;
    let frame = BindStatus::Success.encode();
    let fds = [listener.as_raw_fd()];
    sendmsg::<()>(
        stream.as_raw_fd(),
        &[IoSlice::new(&frame)],
        &[ControlMessage::ScmRights(&fds)],
        MsgFlags::empty(),
        None,
    )
    .context("send listener")?;
    Ok(address)
}
