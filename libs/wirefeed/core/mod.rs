//! # Wirefeed core
//!
//! The client itself: connection-state machine, configuration, the
//! connect/reconnect loop, and the type-state builder.
//!
//! ## Example
//!
//! ```rust,ignore
//! let client = wirefeed::builder()
//!     .url("ws://shop.example/websocket/prices")
//!     .router(PriceRouter, |routing| {
//!         routing.handler(FeedRoute::Updates, PriceUpdateHandler::new(page))
//!     })
//!     .reconnect_strategy(FixedDelay::new(Duration::from_secs(5), None))
//!     .build()
//!     .await?;
//!
//! while let Ok(event) = client.recv_event() {
//!     println!("Event: {:?}", event);
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;

// Re-export main types
pub use builder::{states, RoutingBuilder, SocketClientBuilder};
pub use client::{ClientEvent, Metrics, SocketClient};
pub use config::ClientConfig;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new socket client builder
///
/// Convenience function for starting the builder pattern.
pub fn builder() -> SocketClientBuilder<
    builder::states::NoUrl,
    builder::states::NoRouter,
    (),
    (),
> {
    SocketClientBuilder::new()
}
