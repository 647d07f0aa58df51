//! Local price feed for development.
//!
//! Serves the watcher's WebSocket endpoint on the configured host and
//! broadcasts randomized price updates for the configured items, so the
//! watcher can be exercised without the auction backend.

use anyhow::Result;
use auction::{init_tracing_with_level, ShutdownManager, WatcherConfig};
use auction_price_watch::bin_common::{load_config_from_env, ConfigType};
use futures::{SinkExt, StreamExt};
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Seconds between broadcast price updates
const UPDATE_INTERVAL_SECS: u64 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = load_config_from_env(ConfigType::Watcher);
    let config = WatcherConfig::load(&config_path)?;

    init_tracing_with_level(&config.log_level);

    if config.page.items.is_empty() {
        anyhow::bail!("no items configured, nothing to simulate");
    }

    let listener = TcpListener::bind(&config.feed.host).await?;
    info!("Feed simulator listening on ws://{}", config.feed.host);
    info!(
        "Broadcasting updates for {} items every {}s",
        config.page.items.len(),
        UPDATE_INTERVAL_SECS
    );

    let (frame_tx, _) = broadcast::channel::<String>(64);

    // Accept loop: push every broadcast frame to each connected client
    let accept_tx = frame_tx.clone();
    tokio::spawn(async move {
        while let Ok((stream, peer)) = listener.accept().await {
            info!("Client connected: {}", peer);
            let mut frames = accept_tx.subscribe();

            tokio::spawn(async move {
                let ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        warn!("Handshake failed for {}: {}", peer, e);
                        return;
                    }
                };
                let (mut write, mut read) = ws.split();

                loop {
                    tokio::select! {
                        frame = frames.recv() => {
                            match frame {
                                Ok(text) => {
                                    if write.send(Message::Text(text)).await.is_err() {
                                        break;
                                    }
                                }
                                Err(_) => break,
                            }
                        }
                        incoming = read.next() => {
                            match incoming {
                                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                                _ => {}
                            }
                        }
                    }
                }

                info!("Client disconnected: {}", peer);
            });
        }
    });

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    // Random-walk prices seeded from the configured starting prices
    let mut prices: HashMap<String, f64> = config
        .page
        .items
        .iter()
        .map(|item| (item.id.clone(), item.starting_price))
        .collect();
    let names: HashMap<String, String> = config
        .page
        .items
        .iter()
        .map(|item| (item.id.clone(), item.name.clone()))
        .collect();
    let ids: Vec<String> = config.page.items.iter().map(|i| i.id.clone()).collect();

    while shutdown.is_running() {
        let frame = {
            let mut rng = rand::thread_rng();

            let id = &ids[rng.gen_range(0..ids.len())];
            let price = {
                let entry = prices.entry(id.clone()).or_insert(1.0);
                *entry = (*entry + rng.gen_range(-5.0..10.0)).max(1.0);
                (*entry * 100.0).round() / 100.0
            };

            // Some feed builds omit itemName; simulate that too
            let mut body = serde_json::json!({
                "type": "priceUpdate",
                "itemId": id,
                "price": price,
            });
            if !rng.gen_bool(0.2) {
                body["itemName"] = serde_json::json!(names[id]);
            }
            body.to_string()
        };

        debug!("Broadcasting: {}", frame);
        let _ = frame_tx.send(frame);

        shutdown
            .interruptible_sleep(Duration::from_secs(UPDATE_INTERVAL_SECS))
            .await;
    }

    info!("Feed simulator stopped");
    Ok(())
}
