//! # Auction
//!
//! Domain library for the collectibles price watcher: the price-update event
//! model, the shared currency-formatting contract, an in-memory page model,
//! the ephemeral notification lifecycle, bid-form validation, and the
//! concrete feed-client wiring on top of [`wirefeed`].

pub mod client;
pub mod config;
pub mod domain;
pub mod notify;
pub mod page;
pub mod utils;

// Re-export the pieces binaries touch most
pub use client::{feed_url, spawn_price_watcher, PageLocation, PriceRouter, PriceUpdateHandler};
pub use config::{ConfigError, WatcherConfig};
pub use domain::event::{FeedMessage, FeedRoute, PriceUpdateEvent};
pub use notify::{NotificationCenter, NotificationPhase, NotificationTimings};
pub use page::{InMemoryPage, PageView};
pub use utils::{init_tracing, init_tracing_with_level, Heartbeat, ShutdownManager};
