//! Server side of the handshake.

use std::io::{Read, Write};

use tracing::warn;

use cfdev_protocol::{HANDSHAKE_LEN, Handshake, PROTOCOL_VERSION};

use super::{DISPATCH_TARGET, DispatchError};

/// Reads the client's handshake and answers with the server's.
///
/// Mismatched identities and versions are logged but never rejected; clients
/// in the field rely on that leniency.
pub(crate) fn exchange<S>(stream: &mut S) -> Result<Handshake, DispatchError>
where
    S: Read + Write,
{
    let mut frame = [0_u8; HANDSHAKE_LEN];
    stream
        .read_exact(&mut frame)
        .map_err(|error| DispatchError::from_read(error, DispatchError::TruncatedHandshake))?;
    let peer = Handshake::decode(&frame)?;

    if !peer.is_client() {
        warn!(
            target: DISPATCH_TARGET,
            identity = %String::from_utf8_lossy(&peer.identity()),
            "unexpected client identity; continuing"
        );
    }
    if !peer.version_matches() {
        warn!(
            target: DISPATCH_TARGET,
            version = peer.version(),
            expected = PROTOCOL_VERSION,
            "client protocol version differs; continuing"
        );
    }

    stream
        .write_all(&Handshake::server().encode())
        .and_then(|()| stream.flush())
        .map_err(DispatchError::Write)?;
    Ok(peer)
}
