//! Sync cursor — tracks the last fully processed position in the log
//! and derives the next poll window.

use serde::{Deserialize, Serialize};

/// Inclusive block range for a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    /// First block to query (inclusive).
    pub from: u64,
    /// Last block to query (inclusive).
    pub to: u64,
}

/// Which phase a poll window belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// First poll — bounded replay of recent history.
    Bootstrap,
    /// Following the log head incrementally.
    Live,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// The watcher's position in the append-only log.
///
/// Starts unset; advances only forward, after each fully processed
/// poll. Everything at or below the cursor has been merged into the
/// table exactly once, best-effort: a failed cycle leaves the cursor
/// untouched so the same window is re-queried, and the table's dedup
/// absorbs the duplicate delivery.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SyncCursor {
    position: Option<u64>,
}

impl SyncCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last fully processed block, if any poll completed yet.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    pub fn phase(&self) -> SyncPhase {
        if self.position.is_none() {
            SyncPhase::Bootstrap
        } else {
            SyncPhase::Live
        }
    }

    /// Next poll window against the observed head.
    ///
    /// The first poll covers the most recent `bootstrap_span` blocks
    /// (clamped at genesis) rather than the whole history; afterwards
    /// the window is `[cursor + 1, head]`. `None` means there is
    /// nothing to query this tick.
    pub fn window(&self, head: u64, bootstrap_span: u64) -> Option<BlockRange> {
        match self.position {
            None => {
                let from = head.saturating_sub(bootstrap_span.saturating_sub(1));
                Some(BlockRange { from, to: head })
            }
            Some(pos) if head > pos => Some(BlockRange { from: pos + 1, to: head }),
            Some(_) => None,
        }
    }

    /// Move the cursor forward. Never rewinds, even if `block` is
    /// below the current position.
    pub fn advance(&mut self, block: u64) {
        self.position = Some(match self.position {
            Some(pos) => pos.max(block),
            None => block,
        });
    }
}
