//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing with standard configuration
///
/// Respects `RUST_LOG` when set, otherwise defaults to `info`.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initialize tracing with a default level from configuration
///
/// `RUST_LOG` still wins when set, so a deployed watcher can be turned up
/// without editing its config file.
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();
}
