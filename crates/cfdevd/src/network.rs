//! Loopback interface aliasing.
//!
//! The development VM's director and router are reached through addresses
//! aliased onto the host loopback interface. Adding an alias that already
//! exists, or removing one that is already gone, counts as success.

use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::info;

use crate::host_command::{self, HostCommandError};

const NETWORK_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::network");

/// Manages addresses aliased onto the loopback interface.
#[cfg_attr(test, mockall::automock)]
pub trait LoopbackAliases: Send + Sync {
    /// Ensures every address in `addresses` is aliased onto loopback.
    fn add_aliases(&self, addresses: &[Ipv4Addr]) -> Result<(), AliasError>;

    /// Ensures no address in `addresses` remains aliased onto loopback.
    fn remove_aliases(&self, addresses: &[Ipv4Addr]) -> Result<(), AliasError>;
}

/// Errors raised while changing loopback aliases.
#[derive(Debug, Error)]
pub enum AliasError {
    /// Adding an alias failed.
    #[error("failed to alias {address} onto loopback: {source}")]
    Add {
        /// Address being aliased.
        address: Ipv4Addr,
        /// Host tool failure.
        #[source]
        source: HostCommandError,
    },
    /// Removing an alias failed.
    #[error("failed to remove loopback alias {address}: {source}")]
    Remove {
        /// Address being removed.
        address: Ipv4Addr,
        /// Host tool failure.
        #[source]
        source: HostCommandError,
    },
}

/// Alias manager backed by the platform's interface tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoopbackAliases;

impl LoopbackAliases for SystemLoopbackAliases {
    fn add_aliases(&self, addresses: &[Ipv4Addr]) -> Result<(), AliasError> {
        for &address in addresses {
            let (program, args) = platform::add_command(address);
            tolerate(host_command::run(program, &args), platform::ALREADY_PRESENT)
                .map_err(|source| AliasError::Add { address, source })?;
            info!(target: NETWORK_TARGET, %address, "loopback alias present");
        }
        Ok(())
    }

    fn remove_aliases(&self, addresses: &[Ipv4Addr]) -> Result<(), AliasError> {
        for &address in addresses {
            let (program, args) = platform::remove_command(address);
            tolerate(host_command::run(program, &args), platform::ALREADY_ABSENT)
                .map_err(|source| AliasError::Remove { address, source })?;
            info!(target: NETWORK_TARGET, %address, "loopback alias absent");
        }
        Ok(())
    }
}

/// Treats a failure whose stderr mentions `benign` as success.
fn tolerate(
    result: Result<(), HostCommandError>,
    benign: &str,
) -> Result<(), HostCommandError> {
    match result {
        Err(error) if error.stderr().is_some_and(|stderr| stderr.contains(benign)) => Ok(()),
        other => other,
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use std::net::Ipv4Addr;

    pub(super) const ALREADY_PRESENT: &str = "File exists";
    pub(super) const ALREADY_ABSENT: &str = "Can't assign requested address";

    pub(super) fn add_command(address: Ipv4Addr) -> (&'static str, Vec<String>) {
        ("ifconfig", vec!["lo0".to_owned(), "alias".to_owned(), address.to_string()])
    }

    pub(super) fn remove_command(address: Ipv4Addr) -> (&'static str, Vec<String>) {
        ("ifconfig", vec!["lo0".to_owned(), "-alias".to_owned(), address.to_string()])
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use std::net::Ipv4Addr;

    pub(super) const ALREADY_PRESENT: &str = "File exists";
    pub(super) const ALREADY_ABSENT: &str = "Cannot assign requested address";

    pub(super) fn add_command(address: Ipv4Addr) -> (&'static str, Vec<String>) {
        (
            "ip",
            vec![
                "addr".to_owned(),
                "add".to_owned(),
                format!("{address}/32"),
                "dev".to_owned(),
                "lo".to_owned(),
            ],
        )
    }

    pub(super) fn remove_command(address: Ipv4Addr) -> (&'static str, Vec<String>) {
        (
            "ip",
            vec![
                "addr".to_owned(),
                "del".to_owned(),
                format!("{address}/32"),
                "dev".to_owned(),
                "lo".to_owned(),
            ],
        )
    }
}
