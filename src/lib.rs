//! Auction Price Watch - Main Library
//!
//! Top-level crate tying the workspace together:
//!
//! - **bin_common**: Common utilities for binary executables (CLI)
//! - **auction**: Price-feed domain logic (re-exported from workspace)
//! - **wirefeed**: WebSocket client library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use auction_price_watch::bin_common::{load_config_from_env, ConfigType};
//! use auction_price_watch::auction::WatcherConfig;
//! ```

// Re-export workspace libraries for convenience
pub use auction;
pub use wirefeed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, ConfigType};
}
