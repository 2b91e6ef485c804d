//! Bridge control client — the publisher bridge's liveness surface.
//!
//! The bridge service exposes `GET /status` and `POST /start_bridge`.
//! Dashboards poll status every few seconds to reflect publisher
//! liveness; a probe failure is reported as offline, never raised
//! past the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use registrysync_core::SyncError;

/// `GET /status` response body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub bridge_running: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct StartReply {
    message: String,
}

/// HTTP client for the bridge control service.
pub struct BridgeClient {
    base_url: String,
    http: reqwest::Client,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the publisher bridge is currently running.
    pub async fn status(&self) -> Result<BridgeStatus, SyncError> {
        let url = format!("{}/status", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::Bridge(e.to_string()))?;
        resp.json::<BridgeStatus>()
            .await
            .map_err(|e| SyncError::Bridge(e.to_string()))
    }

    /// Ask the control service to start the bridge. Returns the
    /// service's human-readable message.
    pub async fn start(&self) -> Result<String, SyncError> {
        let url = format!("{}/start_bridge", self.base_url);
        let resp = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| SyncError::Bridge(e.to_string()))?;
        let reply: StartReply = resp
            .json()
            .await
            .map_err(|e| SyncError::Bridge(e.to_string()))?;
        Ok(reply.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_decodes() {
        let status: BridgeStatus = serde_json::from_str(r#"{"bridge_running": true}"#).unwrap();
        assert!(status.bridge_running);
    }

    #[test]
    fn start_reply_decodes() {
        let reply: StartReply =
            serde_json::from_str(r#"{"message": "Bridge starting"}"#).unwrap();
        assert_eq!(reply.message, "Bridge starting");
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = BridgeClient::new("http://localhost:5000///");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
