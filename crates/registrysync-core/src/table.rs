//! The reconciled record table — merges observed batches while keeping
//! the dedup and ordering invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::{Record, ResolutionState};

/// A table row: the on-log record plus its content resolution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub record: Record,
    pub content: ResolutionState,
}

/// Ordered, deduplicated local view of the registry log.
///
/// Entries are kept sorted by timestamp descending, with the content
/// id (ascending) as a tiebreak so merge results never depend on the
/// order individual records were inserted in. `content_id` is unique
/// across the table.
#[derive(Debug, Default)]
pub struct RecordTable {
    entries: Vec<TableEntry>,
    seen: HashSet<String>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge a fetched batch into the table.
    ///
    /// Returns the records that were genuinely new; records whose
    /// `content_id` is already present are skipped, so replaying an
    /// overlapping window is harmless. A duplicate whose other fields
    /// differ is a source anomaly: the first-seen record wins and the
    /// conflict is logged, not surfaced.
    pub fn merge(&mut self, batch: Vec<Record>) -> Vec<Record> {
        let mut added = Vec::new();
        for record in batch {
            if self.seen.contains(&record.content_id) {
                if let Some(existing) = self.get(&record.content_id) {
                    if existing.record.timestamp != record.timestamp
                        || existing.record.publisher != record.publisher
                    {
                        tracing::warn!(
                            content_id = %record.content_id,
                            "duplicate content id with conflicting fields, keeping first seen"
                        );
                    }
                }
                continue;
            }
            self.seen.insert(record.content_id.clone());
            self.insert_sorted(record.clone());
            added.push(record);
        }
        added
    }

    /// Binary-search insert keeping (timestamp desc, content id asc).
    /// New records are near-current, so this lands at the front in
    /// O(log n) instead of re-sorting the table.
    fn insert_sorted(&mut self, record: Record) {
        let idx = self.entries.partition_point(|e| {
            e.record.timestamp > record.timestamp
                || (e.record.timestamp == record.timestamp
                    && e.record.content_id < record.content_id)
        });
        self.entries.insert(
            idx,
            TableEntry {
                record,
                content: ResolutionState::Pending,
            },
        );
    }

    pub fn get(&self, content_id: &str) -> Option<&TableEntry> {
        self.entries
            .iter()
            .find(|e| e.record.content_id == content_id)
    }

    /// Update the resolution state of one row. Returns `false` when
    /// the id is not tracked (e.g. a late completion for a record the
    /// table never merged).
    pub fn set_content(&mut self, content_id: &str, state: ResolutionState) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.record.content_id == content_id)
        {
            Some(entry) => {
                entry.content = state;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Immutable snapshot handed to display sinks.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            entries: self.entries.clone(),
        }
    }
}

/// Cloned, immutable view of the table at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub entries: Vec<TableEntry>,
}

impl TableSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// An empty snapshot is the explicit "no records" display state.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
