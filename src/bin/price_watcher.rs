use anyhow::Result;
use auction::domain::money::format_currency;
use auction::{
    init_tracing_with_level, spawn_price_watcher, Heartbeat, InMemoryPage, NotificationCenter,
    ShutdownManager, WatcherConfig,
};
use auction_price_watch::bin_common::{load_config_from_env, ConfigType};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Watcher);
    let config = WatcherConfig::load(&config_path)?;

    // Initialize logging with configured level
    init_tracing_with_level(&config.log_level);
    config.log();

    // Seed the page model with the configured items
    let page = Arc::new(InMemoryPage::new(&config.page.path));
    for item in &config.page.items {
        page.insert_item(&item.id, format_currency(item.starting_price));

        // On a detail page the matching item also owns the detail node
        if config.page.path == format!("/items/{}", item.id) {
            page.set_detail_node(format_currency(item.starting_price));
        }
    }
    page.format_static_prices();

    let notifications = NotificationCenter::with_timings(config.timings());

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let applied = spawn_price_watcher(
        config.location(),
        Arc::clone(&page),
        notifications.clone(),
        shutdown.flag(),
    )
    .await?;

    print_banner(&config);

    // Liveness loop: nothing to drive, just report progress periodically
    let mut heartbeat = Heartbeat::new(60);
    while shutdown.is_running() {
        if heartbeat.should_beat() {
            info!(
                "Heartbeat: {} updates applied, {} notifications live",
                applied.load(Ordering::Relaxed),
                notifications.live_count()
            );
            heartbeat.beat();
        }

        shutdown.interruptible_sleep(Duration::from_secs(1)).await;
    }

    // Give the feed client a moment to close its connection
    tokio::time::sleep(Duration::from_millis(200)).await;

    print_shutdown();
    Ok(())
}

fn print_banner(config: &WatcherConfig) {
    info!("");
    info!("========================================");
    info!("Starting Auction Price Watcher");
    info!("Page: {}", config.page.path);
    info!("Feed: {}", auction::feed_url(&config.location()));
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown() {
    info!("");
    info!("========================================");
    info!("Price watcher stopped gracefully");
    info!("========================================");
}
