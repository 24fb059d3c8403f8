//! Connection handler that runs one handshake and one command.

use tracing::{debug, info, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::command::read_command;
use super::handshake::exchange;
use super::router::{CommandRouter, Reply};
use super::{DISPATCH_TARGET, DaemonServices, DispatchError};

/// Handles a single helper connection from handshake to reply.
#[derive(Debug, Clone)]
pub(crate) struct CommandConnectionHandler {
    router: CommandRouter,
}

impl CommandConnectionHandler {
    pub(crate) const fn new(services: DaemonServices) -> Self {
        Self {
            router: CommandRouter::new(services),
        }
    }

    fn serve(&self, stream: &mut ConnectionStream) -> Result<Reply, DispatchError> {
        exchange(stream)?;
        let command = read_command(stream)?;
        debug!(
            target: DISPATCH_TARGET,
            command = %command.code(),
            "dispatching command"
        );
        self.router.route(command, stream)
    }
}

impl ConnectionHandler for CommandConnectionHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        match self.serve(&mut stream) {
            Ok(reply) => info!(
                target: DISPATCH_TARGET,
                reply = %reply,
                success = reply.is_success(),
                "command completed"
            ),
            Err(error) if error.is_disconnect() => debug!(
                target: DISPATCH_TARGET,
                error = %error,
                "client disconnected"
            ),
            Err(DispatchError::Unimplemented { code }) => warn!(
                target: DISPATCH_TARGET,
                code,
                "unimplemented command; closing connection"
            ),
            Err(error) => warn!(
                target: DISPATCH_TARGET,
                error = %error,
                "connection handler error"
            ),
        }
    }
}
