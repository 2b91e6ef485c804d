//! Record and content types shared across the sync pipeline.

use serde::{Deserialize, Serialize};

/// One registered data publication, as observed in the event log.
///
/// Records are immutable: created by an external publisher action,
/// observed once by the log reader, never mutated or deleted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Content identifier into the content-addressed store (unique per record).
    pub content_id: String,
    /// 32-byte content digest (`0x…`). Kept for reference; not verified
    /// against the fetched document.
    pub content_hash: String,
    /// Publishing account (`0x…`).
    pub publisher: String,
    /// Publication time in seconds since epoch — the ordering key.
    pub timestamp: i64,
    /// Block the event was emitted in.
    pub block_number: u64,
}

/// Structured sensor content resolved from a gateway.
///
/// Fields absent from the fetched document stay `None`; the display
/// side renders those as `N/A` without dropping the row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl SensorReading {
    /// Extract a reading from a gateway document. Non-object documents
    /// yield an empty reading.
    pub fn from_value(v: &serde_json::Value) -> Self {
        Self {
            temperature: v.get("temperature").and_then(value_as_f64),
            humidity: v.get("humidity").and_then(value_as_f64),
        }
    }

    /// `true` if no expected field was present in the document.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none()
    }
}

/// Gateways are not consistent about numeric encoding — accept numbers
/// and numeric strings.
fn value_as_f64(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Resolution lifecycle of a record's content.
///
/// A record is resolved at most once: either a gateway answers and the
/// row becomes `Resolved`, or every gateway fails and it stays
/// `Unresolved` for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ResolutionState {
    /// No resolution attempt has completed yet.
    Pending,
    /// A gateway returned a document (possibly with missing fields).
    Resolved(SensorReading),
    /// Every gateway failed or timed out.
    Unresolved,
}

impl ResolutionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}
