//! The sync loop — keeps the local table consistent with the log.
//!
//! Each tick runs one poll cycle:
//! 1. Query the log head; on failure skip the cycle (retried next tick).
//! 2. Derive the poll window from the cursor (bootstrap = recent blocks
//!    only, live = `[cursor + 1, head]`, no-op when caught up).
//! 3. Fetch the range and merge it into the table.
//! 4. Spawn one resolution task per genuinely new record.
//! 5. Publish a snapshot and advance the cursor.
//!
//! Resolution tasks are fire-and-forget: a completion may land several
//! cycles later, touches only its own row, and republishes a snapshot.

use std::sync::{Arc, Mutex};

use registrysync_core::{
    ContentResolver, DisplaySink, RecordTable, ResolutionState, SyncConfig, SyncCursor, SyncError,
    TickSource,
};

use crate::fetcher::RegistryLog;

/// Watches a registry log and reconciles it into a shared table.
pub struct SyncLoop<C> {
    config: SyncConfig,
    client: C,
    cursor: SyncCursor,
    table: Arc<Mutex<RecordTable>>,
    resolver: Option<Arc<dyn ContentResolver>>,
    sink: Arc<dyn DisplaySink>,
}

impl<C: RegistryLog> SyncLoop<C> {
    pub fn new(config: SyncConfig, client: C, sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            config,
            client,
            cursor: SyncCursor::new(),
            table: Arc::new(Mutex::new(RecordTable::new())),
            resolver: None,
            sink,
        }
    }

    /// Attach a content resolver. Without one, rows stay `Pending`.
    pub fn with_resolver(mut self, resolver: Arc<dyn ContentResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Shared handle to the reconciled table.
    pub fn table(&self) -> Arc<Mutex<RecordTable>> {
        Arc::clone(&self.table)
    }

    /// Last fully processed block, if any poll completed yet.
    pub fn cursor_position(&self) -> Option<u64> {
        self.cursor.position()
    }

    /// Run poll cycles until the tick source ends.
    ///
    /// No cycle error is fatal: failures are logged and the next tick
    /// retries with an unchanged cursor.
    pub async fn run<T: TickSource>(&mut self, mut ticks: T) {
        while ticks.next_tick().await {
            if let Err(e) = self.poll_once().await {
                tracing::warn!(error = %e, "poll cycle skipped");
            }
        }
        tracing::info!("tick source ended, sync loop stopping");
    }

    /// Run a single poll cycle.
    pub async fn poll_once(&mut self) -> Result<(), SyncError> {
        let head = self.client.head_block_number().await?;
        let phase = self.cursor.phase();
        let Some(range) = self.cursor.window(head, self.config.bootstrap_span) else {
            tracing::debug!(head, "caught up, nothing to poll");
            return Ok(());
        };

        let batch = self.client.fetch_range(range.from, range.to).await?;
        tracing::debug!(
            phase = %phase,
            from = range.from,
            to = range.to,
            fetched = batch.len(),
            "poll window fetched"
        );

        let fresh = self.table.lock().unwrap().merge(batch);
        if !fresh.is_empty() {
            tracing::info!(phase = %phase, new = fresh.len(), "new records reconciled");
        }

        for record in &fresh {
            self.spawn_resolution(record.content_id.clone());
        }

        self.sink.publish(self.table.lock().unwrap().snapshot());
        self.cursor.advance(range.to);
        Ok(())
    }

    fn spawn_resolution(&self, content_id: String) {
        let Some(resolver) = self.resolver.as_ref().map(Arc::clone) else {
            return;
        };
        let table = Arc::clone(&self.table);
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let state = match resolver.resolve(&content_id).await {
                Ok(reading) => ResolutionState::Resolved(reading),
                Err(e) => {
                    tracing::warn!(content_id = %content_id, error = %e, "content resolution failed");
                    ResolutionState::Unresolved
                }
            };

            let snapshot = {
                let mut table = table.lock().unwrap();
                if !table.set_content(&content_id, state) {
                    tracing::debug!(content_id = %content_id, "resolution for an untracked row dropped");
                }
                table.snapshot()
            };
            sink.publish(snapshot);
        });
    }
}
