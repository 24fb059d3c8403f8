//! Command codes and payloads sent after the handshake.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::DecodeError;

/// Length of the `bind` payload: four address bytes and two port bytes.
pub const BIND_PAYLOAD_LEN: usize = 6;

/// One byte command selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    /// Remove the daemon's persistent service registration.
    Uninstall,
    /// Remove the loopback aliases.
    RemoveIpAlias,
    /// Add the loopback aliases.
    AddIpAlias,
    /// Bind a TCP listener and hand it to the caller.
    Bind,
    /// Any code the daemon does not implement.
    Unimplemented(u8),
}

impl CommandCode {
    const UNINSTALL: u8 = 1;
    const REMOVE_IP_ALIAS: u8 = 2;
    const ADD_IP_ALIAS: u8 = 3;
    const BIND: u8 = 6;

    /// Classifies a wire byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            Self::UNINSTALL => Self::Uninstall,
            Self::REMOVE_IP_ALIAS => Self::RemoveIpAlias,
            Self::ADD_IP_ALIAS => Self::AddIpAlias,
            Self::BIND => Self::Bind,
            other => Self::Unimplemented(other),
        }
    }

    /// Wire byte for this code.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Uninstall => Self::UNINSTALL,
            Self::RemoveIpAlias => Self::REMOVE_IP_ALIAS,
            Self::AddIpAlias => Self::ADD_IP_ALIAS,
            Self::Bind => Self::BIND,
            Self::Unimplemented(other) => other,
        }
    }

    /// Number of payload bytes that follow the code on the wire.
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Bind => BIND_PAYLOAD_LEN,
            Self::Uninstall | Self::RemoveIpAlias | Self::AddIpAlias | Self::Unimplemented(_) => 0,
        }
    }
}

impl From<u8> for CommandCode {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninstall => formatter.write_str("uninstall"),
            Self::RemoveIpAlias => formatter.write_str("remove-ip-alias"),
            Self::AddIpAlias => formatter.write_str("add-ip-alias"),
            Self::Bind => formatter.write_str("bind"),
            Self::Unimplemented(code) => write!(formatter, "unimplemented({code})"),
        }
    }
}

/// Address and port the caller wants a listener bound to.
///
/// On the wire the IPv4 address travels as a little-endian `u32`, so the
/// first byte received is the address's least significant octet. The port is
/// a little-endian `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindRequest {
    address: Ipv4Addr,
    port: u16,
}

impl BindRequest {
    /// Builds a request for `address:port`.
    #[must_use]
    pub const fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    /// Requested IPv4 address.
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Requested TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Socket address the listener must be bound to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.port)
    }

    /// Serialises the payload (without the command byte).
    #[must_use]
    #[expect(
        clippy::little_endian_bytes,
        reason = "bind payload fields are little-endian on the wire"
    )]
    pub const fn encode(&self) -> [u8; BIND_PAYLOAD_LEN] {
        let [a0, a1, a2, a3] = self.address.to_bits().to_le_bytes();
        let [p0, p1] = self.port.to_le_bytes();
        [a0, a1, a2, a3, p0, p1]
    }

    /// Parses the payload that follows a `bind` command byte.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Length`] unless `bytes` holds exactly
    /// [`BIND_PAYLOAD_LEN`] bytes.
    #[expect(
        clippy::little_endian_bytes,
        reason = "bind payload fields are little-endian on the wire"
    )]
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let truncated = || DecodeError::length("bind", BIND_PAYLOAD_LEN, bytes.len());
        if bytes.len() != BIND_PAYLOAD_LEN {
            return Err(truncated());
        }
        let (address, rest) = bytes.split_first_chunk::<4>().ok_or_else(truncated)?;
        let (port, _) = rest.split_first_chunk::<2>().ok_or_else(truncated)?;
        Ok(Self::new(
            Ipv4Addr::from_bits(u32::from_le_bytes(*address)),
            u16::from_le_bytes(*port),
        ))
    }
}

impl From<SocketAddrV4> for BindRequest {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

/// A complete command frame: code plus decoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Remove the persistent service registration.
    Uninstall,
    /// Remove the loopback aliases.
    RemoveIpAlias,
    /// Add the loopback aliases.
    AddIpAlias,
    /// Bind a listener on the requested address.
    Bind(BindRequest),
    /// A code the daemon does not implement.
    Unimplemented(u8),
}

impl Command {
    /// Code that introduces this command on the wire.
    #[must_use]
    pub const fn code(&self) -> CommandCode {
        match self {
            Self::Uninstall => CommandCode::Uninstall,
            Self::RemoveIpAlias => CommandCode::RemoveIpAlias,
            Self::AddIpAlias => CommandCode::AddIpAlias,
            Self::Bind(_) => CommandCode::Bind,
            Self::Unimplemented(code) => CommandCode::Unimplemented(*code),
        }
    }

    /// Builds a command from a code and the payload read for it.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Length`] when `payload` is not
    /// [`CommandCode::payload_len`] bytes long.
    pub fn decode(code: CommandCode, payload: &[u8]) -> Result<Self, DecodeError> {
        match code {
            CommandCode::Bind => BindRequest::decode(payload).map(Self::Bind),
            other if !payload.is_empty() => Err(DecodeError::length(
                "command",
                other.payload_len(),
                payload.len(),
            )),
            CommandCode::Uninstall => Ok(Self::Uninstall),
            CommandCode::RemoveIpAlias => Ok(Self::RemoveIpAlias),
            CommandCode::AddIpAlias => Ok(Self::AddIpAlias),
            CommandCode::Unimplemented(byte) => Ok(Self::Unimplemented(byte)),
        }
    }

    /// Serialises the command byte followed by its payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(1 + self.code().payload_len());
        frame.push(self.code().to_byte());
        if let Self::Bind(request) = self {
            frame.extend_from_slice(&request.encode());
        }
        frame
    }
}
