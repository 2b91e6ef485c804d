//! Error types for the sync pipeline.

use thiserror::Error;

/// Errors that can occur while syncing the registry log.
///
/// None of these are fatal: the poll loop skips the cycle on transient
/// failures and keeps running, and resolution failures only mark the
/// affected row unresolved.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The log source could not be reached or answered garbage.
    /// Recovered by skipping the poll cycle and retrying next tick.
    #[error("log source unavailable: {0}")]
    SourceUnavailable(String),

    /// One content gateway failed; the next one in priority order is tried.
    #[error("gateway {url} unavailable: {reason}")]
    GatewayUnavailable { url: String, reason: String },

    /// Every configured gateway failed or timed out for this content id.
    #[error("all gateways exhausted for {content_id}")]
    AllGatewaysExhausted { content_id: String },

    /// A gateway answered but the body was not a usable document.
    #[error("malformed content from {url}: {reason}")]
    MalformedContent { url: String, reason: String },

    /// The bridge control service did not answer properly.
    #[error("bridge control error: {0}")]
    Bridge(String),

    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// `true` if retrying later can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::GatewayUnavailable { .. } | Self::Bridge(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transience_classification() {
        assert!(SyncError::SourceUnavailable("connection refused".into()).is_transient());
        assert!(SyncError::GatewayUnavailable {
            url: "https://ipfs.io/ipfs/Qm1".into(),
            reason: "HTTP 502".into(),
        }
        .is_transient());
        assert!(!SyncError::AllGatewaysExhausted {
            content_id: "Qm1".into()
        }
        .is_transient());
        assert!(!SyncError::MalformedContent {
            url: "https://ipfs.io/ipfs/Qm1".into(),
            reason: "not json".into(),
        }
        .is_transient());
    }
}
