//! # Wirefeed Traits
//!
//! Core traits and types for the wirefeed WebSocket client library:
//!
//! - **MessageRouter**: parse incoming frames and pick a route key
//! - **MessageHandler**: process routed messages sequentially
//! - **ReconnectionStrategy**: control reconnection behavior

pub mod error;
pub mod message;
pub mod reconnect;
pub mod router;

// Re-export commonly used types
pub use error::{Result, WirefeedError};
pub use message::WsMessage;
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
pub use router::{MessageHandler, MessageRouter};
