//! The content resolution seam driven by the sync loop.

use async_trait::async_trait;

use crate::error::SyncError;
use crate::record::SensorReading;

/// Resolves a content id into structured content.
///
/// Implementations try redundant gateways in priority order; the sync
/// loop only sees the final outcome. An error maps the record's row to
/// `Unresolved` — it never fails the loop, and the record is not
/// retried on later cycles.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn resolve(&self, content_id: &str) -> Result<SensorReading, SyncError>;
}
