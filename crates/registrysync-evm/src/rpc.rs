//! HTTP JSON-RPC client for the registry chain.
//!
//! Speaks plain JSON-RPC 2.0 (`eth_blockNumber`, `eth_getLogs`,
//! `eth_getBalance`) — the three calls the watcher needs. Transport
//! failures surface as `SourceUnavailable` and are absorbed by the
//! poll loop, which skips the cycle and retries on the next tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use registrysync_core::{Record, SyncConfig, SyncError};

use crate::fetcher::{decode_registration, parse_hex_u64, RawLog, RegistryLog};

#[derive(Debug, Clone, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

/// JSON-RPC registry client bound to one contract's event log.
pub struct RegistryRpc {
    url: String,
    contract: String,
    event_topic: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl RegistryRpc {
    pub fn new(url: impl Into<String>, config: &SyncConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            url: url.into(),
            contract: config.contract.clone(),
            event_topic: config.event_topic.clone(),
            http,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &'static str, params: Vec<Value>) -> Result<Value, SyncError> {
        let req = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| SyncError::SourceUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SyncError::SourceUnavailable(format!(
                "HTTP {} from {}",
                resp.status().as_u16(),
                self.url
            )));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| SyncError::SourceUnavailable(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(SyncError::SourceUnavailable(format!(
                "RPC error {}: {}",
                err.code, err.message
            )));
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    /// Native balance of `address` in wei, at the latest block.
    pub async fn balance(&self, address: &str) -> Result<u128, SyncError> {
        let result = self
            .call("eth_getBalance", vec![json!(address), json!("latest")])
            .await?;
        let hex = result.as_str().ok_or_else(|| {
            SyncError::SourceUnavailable("eth_getBalance returned a non-string".into())
        })?;
        u128::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| SyncError::SourceUnavailable(format!("bad balance {hex}: {e}")))
    }
}

#[async_trait::async_trait]
impl RegistryLog for RegistryRpc {
    async fn head_block_number(&self) -> Result<u64, SyncError> {
        let result = self.call("eth_blockNumber", vec![]).await?;
        let hex = result.as_str().ok_or_else(|| {
            SyncError::SourceUnavailable("eth_blockNumber returned a non-string".into())
        })?;
        Ok(parse_hex_u64(hex))
    }

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Record>, SyncError> {
        let mut filter = json!({
            "fromBlock": format!("0x{from:x}"),
            "toBlock": format!("0x{to:x}"),
            "address": self.contract,
        });
        if !self.event_topic.is_empty() {
            filter["topics"] = json!([self.event_topic]);
        }

        let result = self.call("eth_getLogs", vec![filter]).await?;
        let logs: Vec<RawLog> = serde_json::from_value(result)
            .map_err(|e| SyncError::SourceUnavailable(format!("bad eth_getLogs response: {e}")))?;

        let mut records = Vec::with_capacity(logs.len());
        for log in logs {
            if log.is_removed() {
                continue;
            }
            match decode_registration(&log) {
                Some(record) => records.push(record),
                None => tracing::warn!(tx = %log.tx_hash, "skipping undecodable registry log"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = RpcRequest {
            jsonrpc: "2.0",
            method: "eth_blockNumber",
            params: vec![],
            id: 7,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"eth_blockNumber\""));
        assert!(json.contains("\"id\":7"));
    }

    #[test]
    fn response_deserializes_result() {
        let body: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x12345"}"#).unwrap();
        assert!(body.error.is_none());
        assert_eq!(body.result.unwrap(), json!("0x12345"));
    }

    #[test]
    fn response_deserializes_error() {
        let body: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"query exceeds limit"}}"#,
        )
        .unwrap();
        let err = body.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "query exceeds limit");
    }
}
