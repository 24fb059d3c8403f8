//! Fixed-size identity exchange that opens every connection.

use std::fmt;

use crate::DecodeError;

/// Length of the identity tag.
pub const IDENTITY_LEN: usize = 5;
/// Length of the reserved trailer.
pub const PADDING_LEN: usize = 40;
const VERSION_LEN: usize = 4;
/// Total length of a handshake frame.
pub const HANDSHAKE_LEN: usize = IDENTITY_LEN + VERSION_LEN + PADDING_LEN;

/// Protocol version spoken by both sides.
pub const PROTOCOL_VERSION: u32 = 22;
/// Identity tag sent by unprivileged clients.
pub const CLIENT_IDENTITY: [u8; IDENTITY_LEN] = *b"VMN3T";
/// Identity tag sent by the daemon.
pub const SERVER_IDENTITY: [u8; IDENTITY_LEN] = *b"CFD3V";

const SERVER_PADDING: [u8; PADDING_LEN] = *b"0123456789012345678901234567890123456789";

/// One side's half of the opening exchange.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    identity: [u8; IDENTITY_LEN],
    version: u32,
    padding: [u8; PADDING_LEN],
}

impl Handshake {
    /// Builds a handshake from its raw parts.
    #[must_use]
    pub const fn new(
        identity: [u8; IDENTITY_LEN],
        version: u32,
        padding: [u8; PADDING_LEN],
    ) -> Self {
        Self {
            identity,
            version,
            padding,
        }
    }

    /// The handshake an unprivileged client opens with.
    #[must_use]
    pub const fn client() -> Self {
        Self::new(CLIENT_IDENTITY, PROTOCOL_VERSION, [0; PADDING_LEN])
    }

    /// The handshake the daemon always answers with.
    #[must_use]
    pub const fn server() -> Self {
        Self::new(SERVER_IDENTITY, PROTOCOL_VERSION, SERVER_PADDING)
    }

    /// Identity tag carried by this handshake.
    #[must_use]
    pub const fn identity(&self) -> [u8; IDENTITY_LEN] {
        self.identity
    }

    /// Protocol version carried by this handshake.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Reserved trailer bytes.
    #[must_use]
    pub const fn padding(&self) -> [u8; PADDING_LEN] {
        self.padding
    }

    /// Whether the identity tag is the client tag.
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.identity == CLIENT_IDENTITY
    }

    /// Whether the identity tag is the daemon tag.
    #[must_use]
    pub fn is_server(&self) -> bool {
        self.identity == SERVER_IDENTITY
    }

    /// Whether the version equals [`PROTOCOL_VERSION`].
    #[must_use]
    pub const fn version_matches(&self) -> bool {
        self.version == PROTOCOL_VERSION
    }

    /// Serialises the handshake into its 49 byte wire form.
    #[must_use]
    #[expect(
        clippy::little_endian_bytes,
        reason = "the handshake version is little-endian on the wire"
    )]
    pub fn encode(&self) -> [u8; HANDSHAKE_LEN] {
        let mut frame = [0_u8; HANDSHAKE_LEN];
        let (identity, rest) = frame.split_at_mut(IDENTITY_LEN);
        identity.copy_from_slice(&self.identity);
        let (version, padding) = rest.split_at_mut(VERSION_LEN);
        version.copy_from_slice(&self.version.to_le_bytes());
        padding.copy_from_slice(&self.padding);
        frame
    }

    /// Parses a handshake frame.
    ///
    /// Decoding never rejects a foreign tag or version; use
    /// [`Handshake::is_client`] and [`Handshake::version_matches`] to classify.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Length`] when `bytes` is not exactly
    /// [`HANDSHAKE_LEN`] bytes long.
    #[expect(
        clippy::little_endian_bytes,
        reason = "the handshake version is little-endian on the wire"
    )]
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let truncated = || DecodeError::length("handshake", HANDSHAKE_LEN, bytes.len());
        if bytes.len() != HANDSHAKE_LEN {
            return Err(truncated());
        }
        let (identity, rest) = bytes
            .split_first_chunk::<IDENTITY_LEN>()
            .ok_or_else(truncated)?;
        let (version, rest) = rest
            .split_first_chunk::<VERSION_LEN>()
            .ok_or_else(truncated)?;
        let (padding, _) = rest
            .split_first_chunk::<PADDING_LEN>()
            .ok_or_else(truncated)?;
        Ok(Self::new(*identity, u32::from_le_bytes(*version), *padding))
    }
}

impl fmt::Debug for Handshake {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Handshake")
            .field("identity", &String::from_utf8_lossy(&self.identity))
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
