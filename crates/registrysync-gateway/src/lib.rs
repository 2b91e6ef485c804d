//! registrysync-gateway — content gateways and the bridge control client.

pub mod bridge;
pub mod resolver;

pub use bridge::{BridgeClient, BridgeStatus};
pub use resolver::{ContentTransport, GatewayPool, HttpTransport};
