//! Configuration passed to each component at construction.
//!
//! No global state: every component receives its config explicitly and
//! can be torn down and rebuilt in tests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the log reader and sync loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Registry contract address whose events are watched.
    pub contract: String,
    /// `topic0` of the registration event (keccak of its signature).
    /// Empty = no topic filter, decode everything the contract emits.
    #[serde(default)]
    pub event_topic: String,
    /// How many trailing blocks the first poll covers. Bounded so a
    /// fresh session never replays the whole history.
    #[serde(default = "default_bootstrap_span")]
    pub bootstrap_span: u64,
    /// Poll cadence in live mode (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_bootstrap_span() -> u64 {
    100
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            contract: String::new(),
            event_topic: String::new(),
            bootstrap_span: default_bootstrap_span(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Configuration for the content gateway pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URLs, tried strictly in order. The content id is
    /// appended verbatim, so each must end with its path prefix.
    pub endpoints: Vec<String>,
    /// Per-gateway fetch timeout (milliseconds).
    #[serde(default = "default_gateway_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_gateway_timeout_ms() -> u64 {
    8_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "https://gateway.pinata.cloud/ipfs/".into(),
                "https://ipfs.io/ipfs/".into(),
                "https://cloudflare-ipfs.com/ipfs/".into(),
                "https://dweb.link/ipfs/".into(),
            ],
            request_timeout_ms: default_gateway_timeout_ms(),
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
