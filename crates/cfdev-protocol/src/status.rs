//! Reply frames written by the daemon after executing a command.

use std::fmt;
use std::io;

/// Length of the status frame that answers `bind`.
pub const BIND_REPLY_LEN: usize = 8;
/// Length of the status frame that answers alias and uninstall commands.
pub const COMMAND_REPLY_LEN: usize = 1;

/// Coarse outcome of a privileged bind.
///
/// The numeric codes are the BSD errno values for the two recognised
/// failures; everything else collapses to [`BindStatus::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindStatus {
    /// The listener was bound and its descriptor accompanies the reply.
    Success,
    /// Another socket already owns the address and port.
    AddressInUse,
    /// The address is not assigned to any local interface.
    AddressNotAvailable,
    /// Any other bind failure.
    Failed,
}

impl BindStatus {
    const SUCCESS: u8 = 0;
    const ADDRESS_IN_USE: u8 = 48;
    const ADDRESS_NOT_AVAILABLE: u8 = 49;
    const FAILED: u8 = 66;

    /// Maps an OS bind error to its wire category.
    #[must_use]
    pub fn from_io_error(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::AddrInUse => Self::AddressInUse,
            io::ErrorKind::AddrNotAvailable => Self::AddressNotAvailable,
            _ => Self::Failed,
        }
    }

    /// Classifies the first byte of a bind reply.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            Self::SUCCESS => Self::Success,
            Self::ADDRESS_IN_USE => Self::AddressInUse,
            Self::ADDRESS_NOT_AVAILABLE => Self::AddressNotAvailable,
            _ => Self::Failed,
        }
    }

    /// Wire byte for this status.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Success => Self::SUCCESS,
            Self::AddressInUse => Self::ADDRESS_IN_USE,
            Self::AddressNotAvailable => Self::ADDRESS_NOT_AVAILABLE,
            Self::Failed => Self::FAILED,
        }
    }

    /// Full reply frame: the status byte followed by reserved zeroes.
    #[must_use]
    pub const fn encode(self) -> [u8; BIND_REPLY_LEN] {
        let mut frame = [0_u8; BIND_REPLY_LEN];
        frame[0] = self.to_byte();
        frame
    }

    /// Whether the bind succeeded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short human-readable explanation.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "listener bound",
            Self::AddressInUse => "port already in use",
            Self::AddressNotAvailable => "address not available",
            Self::Failed => "unknown failure",
        }
    }
}

impl fmt::Display for BindStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.description())
    }
}

/// Pass/fail reply for alias and uninstall commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    /// The privileged operation completed.
    Success,
    /// The privileged operation failed; no detail travels on the wire.
    Failure,
}

impl CommandStatus {
    /// Collapses an operation result into a status.
    #[must_use]
    pub const fn from_result<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(_) => Self::Failure,
        }
    }

    /// Classifies a reply byte; anything but zero is a failure.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::Success,
            _ => Self::Failure,
        }
    }

    /// Wire byte for this status.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}
