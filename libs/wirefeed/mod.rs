//! # Wirefeed
//!
//! A small, modular WebSocket client library for server-pushed event feeds.
//!
//! ## Features
//!
//! - **Explicit connection state**: the `Connecting -> Open -> Closed` cycle
//!   is a tagged enum with an atomic wrapper, not a side effect of callbacks
//! - **Self-healing**: pluggable reconnection strategies, from a fixed
//!   constant interval to exponential backoff
//! - **Typed routing**: each frame is parsed into a typed message and routed
//!   to a dedicated handler thread by route key
//! - **Type-state builder**: compile-time guarantees for required configuration
//! - **Testable without a network**: decode failures never tear down the
//!   connection, and the whole lifecycle can be driven by a mock server

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use core::{
    builder, client, config, connection_state,
    builder::{states, RoutingBuilder, SocketClientBuilder},
    client::{ClientEvent, Metrics, SocketClient},
    config::ClientConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
};

/// Type alias for Result with WirefeedError
pub type Result<T> = std::result::Result<T, traits::WirefeedError>;
