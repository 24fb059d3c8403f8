//! Unprivileged client for the cfdevd privileged helper.
//!
//! Every call opens a fresh connection to the helper socket, performs the
//! handshake, sends one command, and reads its reply. The helper serves a
//! single exchange per connection, so a [`Client`] holds no open socket and
//! can be shared freely.
//!
//! ```no_run
//! use std::net::{Ipv4Addr, SocketAddrV4};
//!
//! let client = cfdev_client::Client::new("/var/tmp/cfdevd.socket");
//! client.add_ip_aliases()?;
//! let listener = client.bind(SocketAddrV4::new(Ipv4Addr::new(10, 245, 0, 2), 443))?;
//! # drop(listener);
//! # Ok::<(), cfdev_client::ClientError>(())
//! ```

mod errors;
pub mod installation;
mod transport;

use std::io::{self, Read, Write};
use std::net::{SocketAddrV4, TcpListener};
use std::os::unix::net::UnixStream;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use cfdev_config::Config;
use cfdev_protocol::{
    BIND_REPLY_LEN, BindRequest, BindStatus, COMMAND_REPLY_LEN, Command, CommandStatus,
};

pub use errors::{ClientError, InstallationError};

pub(crate) const CLIENT_TARGET: &str = "cfdev_client";

/// Handle on the helper listening at a Unix socket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    socket: Utf8PathBuf,
}

impl Client {
    /// Targets the helper listening on `socket`.
    pub fn new(socket: impl Into<Utf8PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Targets the socket named by the shared configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.daemon_socket())
    }

    /// Socket this client dials.
    #[must_use]
    pub fn socket(&self) -> &Utf8Path {
        &self.socket
    }

    /// Asks the helper to bind a TCP listener on `address` and returns it.
    ///
    /// The listener arrives as a transferred descriptor; it is already
    /// listening and owned solely by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Bind`] with the helper's status when the bind
    /// fails, [`ClientError::MissingDescriptor`] when a success reply carries
    /// no descriptor, or a transport error.
    pub fn bind(&self, address: SocketAddrV4) -> Result<TcpListener, ClientError> {
        let command = Command::Bind(BindRequest::from(address));
        let mut stream = self.send(command)?;
        let read_error = |source: io::Error| ClientError::ReadReply {
            command: command.code(),
            source,
        };

        let mut frame = [0_u8; BIND_REPLY_LEN];
        let (received, descriptor) =
            transport::receive_with_fd(&stream, &mut frame).map_err(read_error)?;
        if let Some(rest) = frame.get_mut(received..) {
            stream.read_exact(rest).map_err(read_error)?;
        }

        let [status, ..] = frame;
        let status = BindStatus::from_byte(status);
        if !status.is_success() {
            return Err(ClientError::Bind(status));
        }
        let listener = descriptor
            .map(TcpListener::from)
            .ok_or(ClientError::MissingDescriptor)?;
        debug!(target: CLIENT_TARGET, %address, "received bound listener");
        Ok(listener)
    }

    /// Adds the configured loopback aliases on the host.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::CommandFailed`] when the helper reports failure,
    /// or a transport error.
    pub fn add_ip_aliases(&self) -> Result<(), ClientError> {
        self.run(Command::AddIpAlias)
    }

    /// Removes the configured loopback aliases from the host.
    ///
    /// # Errors
    ///
    /// As for [`Client::add_ip_aliases`].
    pub fn remove_ip_aliases(&self) -> Result<(), ClientError> {
        self.run(Command::RemoveIpAlias)
    }

    /// Asks the helper to deregister and delete itself.
    ///
    /// # Errors
    ///
    /// As for [`Client::add_ip_aliases`].
    pub fn uninstall(&self) -> Result<(), ClientError> {
        self.run(Command::Uninstall)
    }

    fn run(&self, command: Command) -> Result<(), ClientError> {
        let mut stream = self.send(command)?;
        let mut reply = [0_u8; COMMAND_REPLY_LEN];
        stream
            .read_exact(&mut reply)
            .map_err(|source| ClientError::ReadReply {
                command: command.code(),
                source,
            })?;
        let [status] = reply;
        if CommandStatus::from_byte(status).is_success() {
            debug!(target: CLIENT_TARGET, command = %command.code(), "command succeeded");
            Ok(())
        } else {
            Err(ClientError::CommandFailed {
                command: command.code(),
            })
        }
    }

    fn send(&self, command: Command) -> Result<UnixStream, ClientError> {
        let mut stream =
            transport::connect(&self.socket).map_err(|source| ClientError::Connect {
                socket: self.socket.clone(),
                source,
            })?;
        transport::handshake(&mut stream)?;
        stream
            .write_all(&command.encode())
            .map_err(|source| ClientError::SendCommand {
                command: command.code(),
                source,
            })?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests;
