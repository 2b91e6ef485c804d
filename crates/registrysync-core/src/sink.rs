//! Display sinks — the presentation side of the pipeline.
//!
//! The sync loop publishes a fresh immutable snapshot after every
//! merge and after every resolution completes. Sinks render however
//! they like; the core never holds a reference to presentation state.

use std::sync::Mutex;

use crate::table::TableSnapshot;

/// Consumer of reconciled table snapshots.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, snapshot: TableSnapshot);
}

/// Collects snapshots in memory, for tests and embedders.
#[derive(Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<TableSnapshot>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every snapshot published so far, in order.
    pub fn snapshots(&self) -> Vec<TableSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<TableSnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

impl DisplaySink for MemorySink {
    fn publish(&self, snapshot: TableSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot);
    }
}

/// Logs a one-line summary per snapshot.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn publish(&self, snapshot: TableSnapshot) {
        if snapshot.is_empty() {
            tracing::info!("no records registered yet");
        } else {
            tracing::info!(records = snapshot.len(), "table updated");
        }
    }
}
