//! registrysync-core — foundation for the registry log watcher.
//!
//! # Architecture
//!
//! ```text
//! SyncLoop (registrysync-evm)
//!     ├── SyncCursor      (poll window policy, forward-only)
//!     ├── RecordTable     (dedup + ordering invariants)
//!     ├── ContentResolver (gateway fallback — registrysync-gateway)
//!     ├── TickSource      (injected scheduling, manual in tests)
//!     └── DisplaySink     (immutable snapshot consumer)
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod record;
pub mod resolve;
pub mod sink;
pub mod table;
pub mod tick;

pub use config::{GatewayConfig, SyncConfig};
pub use cursor::{BlockRange, SyncCursor, SyncPhase};
pub use error::SyncError;
pub use record::{Record, ResolutionState, SensorReading};
pub use resolve::ContentResolver;
pub use sink::{DisplaySink, MemorySink, TracingSink};
pub use table::{RecordTable, TableEntry, TableSnapshot};
pub use tick::{IntervalTicks, ManualTicks, TickHandle, TickSource};
