//! Routes decoded commands to their handlers and writes single-byte replies.

use std::fmt;
use std::io::Write;

use tracing::{info, warn};

use cfdev_protocol::{BindStatus, Command, CommandStatus};

use crate::transport::ConnectionStream;

use super::bind::handle_bind;
use super::{DISPATCH_TARGET, DaemonServices, DispatchError};

/// Reply written for a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    Bind(BindStatus),
    Command(CommandStatus),
}

impl Reply {
    pub(crate) const fn is_success(self) -> bool {
        match self {
            Self::Bind(status) => status.is_success(),
            Self::Command(status) => status.is_success(),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(status) => write!(formatter, "bind:{}", status.to_byte()),
            Self::Command(status) => write!(formatter, "status:{}", status.to_byte()),
        }
    }
}

/// Dispatches commands against the helper's privileged services.
#[derive(Debug, Clone)]
pub(crate) struct CommandRouter {
    services: DaemonServices,
}

impl CommandRouter {
    pub(crate) const fn new(services: DaemonServices) -> Self {
        Self { services }
    }

    /// Runs `command` and writes its reply to `stream`.
    pub(crate) fn route(
        &self,
        command: Command,
        stream: &mut ConnectionStream,
    ) -> Result<Reply, DispatchError> {
        match command {
            Command::Bind(request) => handle_bind(request, stream).map(Reply::Bind),
            Command::AddIpAlias => {
                let addresses = self.services.alias_addresses();
                let result = self.services.aliases().add_aliases(addresses);
                log_failure(command, result.as_ref().err());
                write_status(stream, CommandStatus::from_result(&result))
            }
            Command::RemoveIpAlias => {
                let addresses = self.services.alias_addresses();
                let result = self.services.aliases().remove_aliases(addresses);
                log_failure(command, result.as_ref().err());
                write_status(stream, CommandStatus::from_result(&result))
            }
            Command::Uninstall => {
                info!(target: DISPATCH_TARGET, "uninstall requested by client");
                let result = self.services.lifecycle().uninstall();
                log_failure(command, result.as_ref().err());
                write_status(stream, CommandStatus::from_result(&result))
            }
            Command::Unimplemented(code) => Err(DispatchError::Unimplemented { code }),
        }
    }
}

fn log_failure(command: Command, error: Option<&impl std::error::Error>) {
    if let Some(error) = error {
        warn!(
            target: DISPATCH_TARGET,
            command = %command.code(),
            error = %error,
            "privileged operation failed"
        );
    }
}

fn write_status<W>(stream: &mut W, status: CommandStatus) -> Result<Reply, DispatchError>
where
    W: Write,
{
    stream
        .write_all(&[status.to_byte()])
        .and_then(|()| stream.flush())
        .map_err(DispatchError::Write)?;
    Ok(Reply::Command(status))
}
