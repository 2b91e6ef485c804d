//! Fluent builder for `SyncConfig`.
//!
//! # Example
//!
//! ```rust
//! use registrysync_evm::SyncBuilder;
//!
//! let config = SyncBuilder::new()
//!     .contract("0x82aB691cbA54EB95E09aC69Cc170AB14bBf1299e")
//!     .bootstrap_span(100)
//!     .poll_interval_ms(5_000)
//!     .build_config();
//! ```

use registrysync_core::SyncConfig;

/// Fluent builder for [`SyncConfig`].
#[derive(Default)]
pub struct SyncBuilder {
    config: SyncConfig,
}

impl SyncBuilder {
    pub fn new() -> Self {
        Self {
            config: SyncConfig::default(),
        }
    }

    /// Set the registry contract address to watch.
    pub fn contract(mut self, address: impl Into<String>) -> Self {
        self.config.contract = address.into();
        self
    }

    /// Set the registration event's `topic0` filter.
    pub fn event_topic(mut self, topic: impl Into<String>) -> Self {
        self.config.event_topic = topic.into();
        self
    }

    /// Set how many trailing blocks the first poll covers.
    pub fn bootstrap_span(mut self, blocks: u64) -> Self {
        self.config.bootstrap_span = blocks;
        self
    }

    /// Set the live polling interval in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Build the [`SyncConfig`].
    pub fn build_config(self) -> SyncConfig {
        self.config
    }
}
