//! WebSocket client for the live price feed
//!
//! Wires a [`wirefeed`] socket client to the page model: frames are decoded
//! into price events, patched into whatever price nodes the current page
//! has, and surfaced as transient notifications. The connection reconnects
//! forever on a fixed delay; there is no replay of updates missed while
//! disconnected.

use crate::domain::event::{decode_frame, FeedMessage, FeedRoute};
use crate::domain::money::format_currency;
use crate::notify::NotificationCenter;
use crate::page::PageView;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wirefeed::traits::{FixedDelay, MessageHandler, MessageRouter, WirefeedError, WsMessage};
use wirefeed::{builder, ClientEvent};

/// Path the feed endpoint lives at, relative to the page host
pub const FEED_PATH: &str = "/websocket/prices";

/// Delay between reconnection attempts in milliseconds
const RECONNECT_DELAY_MS: u64 = 5000;

// =============================================================================
// URL Builder
// =============================================================================

/// Where the page was served from
///
/// The feed URL is derived from this, never configured separately, so the
/// socket always points back at the host that rendered the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Host and port, e.g. `localhost:7070`
    pub host: String,
    /// Whether the page came over TLS
    pub secure: bool,
}

impl PageLocation {
    pub fn new(host: impl Into<String>, secure: bool) -> Self {
        Self {
            host: host.into(),
            secure,
        }
    }
}

/// Build the feed URL for a page location
///
/// `wss://` when the page is secure, `ws://` otherwise.
pub fn feed_url(location: &PageLocation) -> String {
    let scheme = if location.secure { "wss" } else { "ws" };
    format!("{}://{}{}", scheme, location.host, FEED_PATH)
}

// =============================================================================
// Router - Parses feed frames
// =============================================================================

/// Router for decoding price-feed frames
pub struct PriceRouter;

impl PriceRouter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PriceRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MessageRouter for PriceRouter {
    type Message = FeedMessage;
    type RouteKey = FeedRoute;

    async fn parse(&self, message: WsMessage) -> wirefeed::Result<Self::Message> {
        let text = match message.as_text() {
            Some(t) => t,
            None => return Err(WirefeedError::Parse("binary frame on text feed".into())),
        };

        decode_frame(text)
    }

    fn route_key(&self, _message: &Self::Message) -> Self::RouteKey {
        FeedRoute::Updates
    }
}

// =============================================================================
// Handler - Applies updates to the page
// =============================================================================

/// Handler that patches price updates into the page
///
/// Applying the same event twice leaves the page identical: each update
/// fully replaces the target text, so the operation is idempotent.
pub struct PriceUpdateHandler<P: PageView> {
    page: Arc<P>,
    notifications: NotificationCenter,
    applied: Arc<AtomicU64>,
    ignored: u64,
}

impl<P: PageView> PriceUpdateHandler<P> {
    pub fn new(page: Arc<P>, notifications: NotificationCenter, applied: Arc<AtomicU64>) -> Self {
        Self {
            page,
            notifications,
            applied,
            ignored: 0,
        }
    }

    fn apply_update(&self, event: &crate::domain::event::PriceUpdateEvent) {
        let text = format_currency(event.price);

        let patched_list = self.page.patch_list_price(&event.item_id, &text);

        // The detail node is only this item's when the path says so; any
        // other page leaves it alone.
        let on_detail_page = self.page.path() == format!("/items/{}", event.item_id);
        let patched_detail = on_detail_page && self.page.patch_detail_price(&text);

        if !patched_list && !patched_detail {
            debug!(
                "[Price WS] No node for {} on this page, dropped",
                event.item_id
            );
        }

        // The notification fires regardless of whether a node was patched
        self.notifications.push(event.display_label(), &text);

        self.applied.fetch_add(1, Ordering::Relaxed);
    }
}

impl<P: PageView + 'static> MessageHandler<FeedMessage> for PriceUpdateHandler<P> {
    fn handle(&mut self, message: FeedMessage) -> wirefeed::Result<()> {
        match message {
            FeedMessage::PriceUpdate(event) => self.apply_update(&event),
            FeedMessage::Ignored(kind) => {
                self.ignored += 1;
                debug!(
                    "[Price WS] Ignoring frame type {:?} ({} ignored so far)",
                    kind, self.ignored
                );
            }
        }

        Ok(())
    }
}

// =============================================================================
// Watcher task
// =============================================================================

/// Handle a socket client event, returning `false` when the watcher loop
/// should stop draining
fn handle_client_event(event: ClientEvent) -> bool {
    match event {
        ClientEvent::Connected => {
            info!("[Price WS] Connected to price feed");
            true
        }
        ClientEvent::Disconnected => {
            warn!("[Price WS] Disconnected from price feed");
            true
        }
        ClientEvent::Reconnecting(attempt) => {
            info!("[Price WS] Reconnecting (attempt {})", attempt);
            true
        }
        ClientEvent::Error(err) => {
            warn!("[Price WS] Error: {}", err);
            true
        }
    }
}

/// Spawn the price watcher for a page.
///
/// Connects to the feed derived from `location`, patches updates into
/// `page`, and pushes a notification per update. Reconnects forever on a
/// fixed delay until `shutdown_flag` is cleared.
///
/// Returns a counter of updates applied so far, for liveness logging.
pub async fn spawn_price_watcher<P>(
    location: PageLocation,
    page: Arc<P>,
    notifications: NotificationCenter,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<Arc<AtomicU64>>
where
    P: PageView + 'static,
{
    let applied = Arc::new(AtomicU64::new(0));

    let url = feed_url(&location);
    info!("[Price WS] Watching {}", url);

    let handler = PriceUpdateHandler::new(page, notifications, Arc::clone(&applied));

    let client = builder()
        .url(&url)
        .router(PriceRouter::new(), move |routing| {
            routing.handler(FeedRoute::Updates, handler)
        })
        .reconnect_strategy(FixedDelay::new(
            Duration::from_millis(RECONNECT_DELAY_MS),
            None,
        ))
        .shutdown_flag(Arc::clone(&shutdown_flag))
        .build()
        .await?;

    tokio::spawn(async move {
        loop {
            if !shutdown_flag.load(Ordering::Acquire) {
                info!("[Price WS] Shutdown signal received");
                break;
            }

            match client.try_recv_event() {
                Some(event) => {
                    handle_client_event(event);
                }
                None => {
                    sleep(Duration::from_millis(10)).await;
                }
            }
        }

        info!("[Price WS] Closing connection");
        if let Err(e) = client.shutdown().await {
            warn!("[Price WS] Error during shutdown: {}", e);
        }
    });

    Ok(applied)
}

// =============================================================================
// Tests
// =============================================================================
