//! Network module.
//!
//! Contains the gateway client: the long-lived WebSocket session that feeds
//! dispatch events to the handler router.

mod gateway;

pub use gateway::GatewayClient;
