//! Bridge between the world session and the external transport.
//!
//! The transport itself (sockets, reconnect logic, authentication) lives
//! outside this crate; it talks to the session through the channel pair
//! created here and through the JSON wire payloads `bridge::parse_event`
//! understands.

pub mod bridge;

// Re-export main types for convenience
pub use bridge::{bridge_channel, parse_event, BridgeTransport, NetworkBridge};
