//! Reading the command frame that follows the handshake.

use std::io::Read;

use cfdev_protocol::{Command, CommandCode};

use super::DispatchError;

/// Reads the command byte and exactly the payload that code requires.
pub(crate) fn read_command<R>(stream: &mut R) -> Result<Command, DispatchError>
where
    R: Read,
{
    let mut code = [0_u8; 1];
    stream
        .read_exact(&mut code)
        .map_err(|error| DispatchError::from_read(error, DispatchError::MissingCommand))?;
    let [byte] = code;
    let code = CommandCode::from_byte(byte);

    let mut payload = vec![0_u8; code.payload_len()];
    stream
        .read_exact(&mut payload)
        .map_err(|error| DispatchError::from_read(error, DispatchError::TruncatedPayload { code }))?;
    Ok(Command::decode(code, &payload)?)
}
