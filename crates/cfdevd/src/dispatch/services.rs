//! Privileged collaborators used by command handlers.

use std::net::Ipv4Addr;
use std::sync::Arc;

use cfdev_config::Config;

use crate::network::{LoopbackAliases, SystemLoopbackAliases};
use crate::service::{InstalledDaemon, ServiceLifecycle};

/// Host-facing capabilities behind the alias and uninstall commands.
#[derive(Clone)]
pub struct DaemonServices {
    aliases: Arc<dyn LoopbackAliases>,
    lifecycle: Arc<dyn ServiceLifecycle>,
    alias_addresses: [Ipv4Addr; 2],
}

impl DaemonServices {
    /// Assembles services from explicit collaborators.
    pub fn new(
        aliases: Arc<dyn LoopbackAliases>,
        lifecycle: Arc<dyn ServiceLifecycle>,
        alias_addresses: [Ipv4Addr; 2],
    ) -> Self {
        Self {
            aliases,
            lifecycle,
            alias_addresses,
        }
    }

    /// Services that act on the real host.
    #[must_use]
    pub fn system(config: &Config) -> Self {
        Self::new(
            Arc::new(SystemLoopbackAliases),
            Arc::new(InstalledDaemon::for_config(config)),
            config.loopback_aliases(),
        )
    }

    pub(crate) fn aliases(&self) -> &dyn LoopbackAliases {
        self.aliases.as_ref()
    }

    pub(crate) fn lifecycle(&self) -> &dyn ServiceLifecycle {
        self.lifecycle.as_ref()
    }

    /// Director and router addresses managed by the alias commands.
    #[must_use]
    pub const fn alias_addresses(&self) -> &[Ipv4Addr; 2] {
        &self.alias_addresses
    }
}

impl std::fmt::Debug for DaemonServices {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DaemonServices")
            .field("alias_addresses", &self.alias_addresses)
            .finish_non_exhaustive()
    }
}
