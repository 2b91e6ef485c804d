//! registrysync-evm — EVM-backed log reader and the sync loop.

pub mod builder;
pub mod fetcher;
pub mod poller;
pub mod rpc;

pub use builder::SyncBuilder;
pub use fetcher::{decode_registration, parse_hex_u64, RawLog, RegistryLog};
pub use poller::SyncLoop;
pub use rpc::RegistryRpc;
