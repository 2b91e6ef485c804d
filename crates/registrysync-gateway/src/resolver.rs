//! Gateway pool — resolves content ids with ordered fallback.
//!
//! Gateways are tried strictly in configuration order. The first one
//! returning a parseable JSON document wins and later gateways are
//! never contacted; one layer of pinning-service envelope
//! (`pinataContent`) is unwrapped when present. Each attempt is
//! bounded by the configured per-gateway timeout. The pool keeps no
//! per-record state — callers attempt each record at most once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use registrysync_core::{ContentResolver, GatewayConfig, SensorReading, SyncError};

/// Fetches one URL and parses the body as JSON.
#[async_trait]
pub trait ContentTransport: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, SyncError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("registrysync/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }
}

#[async_trait]
impl ContentTransport for HttpTransport {
    async fn fetch_json(&self, url: &str) -> Result<Value, SyncError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::GatewayUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(SyncError::GatewayUnavailable {
                url: url.to_string(),
                reason: format!("HTTP {}", resp.status().as_u16()),
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| SyncError::MalformedContent {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Ordered pool of content gateways.
pub struct GatewayPool {
    gateways: Vec<String>,
    transport: Arc<dyn ContentTransport>,
    attempt_timeout: Duration,
}

impl GatewayPool {
    /// Pool with the reqwest transport.
    pub fn http(config: GatewayConfig) -> Self {
        let timeout = config.request_timeout();
        Self::with_transport(config, Arc::new(HttpTransport::new(timeout)))
    }

    /// Pool over a caller-provided transport (tests, instrumentation).
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn ContentTransport>) -> Self {
        let attempt_timeout = config.request_timeout();
        Self {
            gateways: config.endpoints,
            transport,
            attempt_timeout,
        }
    }

    pub fn gateway_count(&self) -> usize {
        self.gateways.len()
    }
}

#[async_trait]
impl ContentResolver for GatewayPool {
    async fn resolve(&self, content_id: &str) -> Result<SensorReading, SyncError> {
        for gateway in &self.gateways {
            let url = format!("{gateway}{content_id}");
            match tokio::time::timeout(self.attempt_timeout, self.transport.fetch_json(&url)).await
            {
                Err(_) => {
                    tracing::debug!(%url, timeout_ms = self.attempt_timeout.as_millis() as u64, "gateway attempt timed out");
                }
                Ok(Err(e)) => {
                    tracing::debug!(%url, error = %e, "gateway attempt failed");
                }
                Ok(Ok(document)) => {
                    let body = unwrap_envelope(document);
                    let reading = SensorReading::from_value(&body);
                    if reading.is_empty() {
                        tracing::warn!(%url, content_id, "document missing expected fields");
                    }
                    return Ok(reading);
                }
            }
        }
        Err(SyncError::AllGatewaysExhausted {
            content_id: content_id.to_string(),
        })
    }
}

/// Peel one layer of pinning-service envelope if present.
fn unwrap_envelope(document: Value) -> Value {
    match document {
        Value::Object(mut map) => map
            .remove("pinataContent")
            .unwrap_or(Value::Object(map)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    #[derive(Clone)]
    enum Reply {
        Ok(Value),
        Fail,
        Hang,
    }

    struct MockTransport {
        replies: HashMap<String, Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn new(replies: Vec<(&str, Reply)>) -> Arc<Self> {
            Arc::new(Self {
                replies: replies
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentTransport for MockTransport {
        async fn fetch_json(&self, url: &str) -> Result<Value, SyncError> {
            self.calls.lock().unwrap().push(url.to_string());
            let reply = self
                .replies
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix.as_str()))
                .map(|(_, r)| r.clone());
            match reply {
                Some(Reply::Ok(v)) => Ok(v),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3_600)).await;
                    Err(SyncError::GatewayUnavailable {
                        url: url.to_string(),
                        reason: "hung".into(),
                    })
                }
                _ => Err(SyncError::GatewayUnavailable {
                    url: url.to_string(),
                    reason: "HTTP 502".into(),
                }),
            }
        }
    }

    fn config(endpoints: &[&str]) -> GatewayConfig {
        GatewayConfig {
            endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
            request_timeout_ms: 8_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_gateway_falls_through_and_later_ones_untouched() {
        let transport = MockTransport::new(vec![
            ("https://one/", Reply::Hang),
            ("https://two/", Reply::Ok(json!({"temperature": 22, "humidity": 55}))),
            ("https://three/", Reply::Ok(json!({"temperature": 0}))),
        ]);
        let pool = GatewayPool::with_transport(
            config(&["https://one/", "https://two/", "https://three/"]),
            transport.clone(),
        );

        let reading = pool.resolve("Qm2").await.unwrap();
        assert_eq!(reading.temperature, Some(22.0));
        assert_eq!(reading.humidity, Some(55.0));

        let calls = transport.calls();
        assert_eq!(calls, vec!["https://one/Qm2", "https://two/Qm2"]);
    }

    #[tokio::test]
    async fn all_gateways_failing_is_exhaustion() {
        let transport = MockTransport::new(vec![
            ("https://one/", Reply::Fail),
            ("https://two/", Reply::Fail),
        ]);
        let pool =
            GatewayPool::with_transport(config(&["https://one/", "https://two/"]), transport);

        match pool.resolve("Qm3").await {
            Err(SyncError::AllGatewaysExhausted { content_id }) => assert_eq!(content_id, "Qm3"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_success_stops_iteration() {
        let transport = MockTransport::new(vec![
            ("https://one/", Reply::Ok(json!({"temperature": 19}))),
            ("https://two/", Reply::Ok(json!({"temperature": 99}))),
        ]);
        let pool = GatewayPool::with_transport(
            config(&["https://one/", "https://two/"]),
            transport.clone(),
        );

        let reading = pool.resolve("Qm1").await.unwrap();
        assert_eq!(reading.temperature, Some(19.0));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn pinning_envelope_is_unwrapped() {
        let transport = MockTransport::new(vec![(
            "https://one/",
            Reply::Ok(json!({"pinataContent": {"temperature": 21.5, "humidity": 48}})),
        )]);
        let pool = GatewayPool::with_transport(config(&["https://one/"]), transport);

        let reading = pool.resolve("Qm4").await.unwrap();
        assert_eq!(reading.temperature, Some(21.5));
        assert_eq!(reading.humidity, Some(48.0));
    }

    #[tokio::test]
    async fn non_object_document_resolves_empty() {
        // A gateway that answers with JSON stops the fallback even when
        // the document has none of the expected fields.
        let transport = MockTransport::new(vec![
            ("https://one/", Reply::Ok(json!("not sensor data"))),
            ("https://two/", Reply::Ok(json!({"temperature": 22}))),
        ]);
        let pool = GatewayPool::with_transport(
            config(&["https://one/", "https://two/"]),
            transport.clone(),
        );

        let reading = pool.resolve("Qm5").await.unwrap();
        assert!(reading.is_empty());
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn envelope_unwrap_passes_plain_documents_through() {
        let plain = json!({"temperature": 1});
        assert_eq!(unwrap_envelope(plain.clone()), plain);
        assert_eq!(
            unwrap_envelope(json!({"pinataContent": {"temperature": 1}})),
            json!({"temperature": 1})
        );
    }
}
