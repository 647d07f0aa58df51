//! Ephemeral price notifications
//!
//! Each incoming update raises a notification that lives through a fixed
//! lifecycle and is then destroyed:
//!
//! ```text
//! insert (Entering) -> next frame (Visible) -> dwell -> Exiting -> exit delay -> removed
//! ```
//!
//! The one-frame hop before `Visible` mirrors the entrance-animation rule:
//! the transition must be observable, not collapsed into the insertion.
//! Notifications are independent: each owns its own timers, coexisting
//! without a cap or dedup, and removal happens at most once.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timer intervals for the notification lifecycle
///
/// Configurable so tests can run the lifecycle in milliseconds; defaults
/// match the page behavior.
#[derive(Debug, Clone, Copy)]
pub struct NotificationTimings {
    /// Delay standing in for "next animation frame" before the entrance
    /// transition is considered visible
    pub entrance_frame: Duration,
    /// How long the notification stays visible before its exit begins
    pub dwell: Duration,
    /// Exit transition duration; the element is removed after it
    pub exit: Duration,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            entrance_frame: Duration::from_millis(16),
            dwell: Duration::from_millis(15_000),
            exit: Duration::from_millis(500),
        }
    }
}

/// Where a notification is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    /// Inserted, entrance transition not yet triggered
    Entering,
    /// On screen for the dwell interval
    Visible,
    /// Exit transition running
    Exiting,
}

/// A live notification
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    /// Item name (or id fallback) shown in the banner
    pub item_label: String,
    /// Already-formatted price text
    pub price_text: String,
    pub phase: NotificationPhase,
}

/// Owns the live notifications and drives their lifecycles
///
/// Cheap to clone; all clones share the same live set. Must be created
/// inside a tokio runtime; each `push` spawns the timer task on the
/// runtime that created the center, so handler OS threads can push without
/// being async themselves.
#[derive(Clone)]
pub struct NotificationCenter {
    live: Arc<DashMap<u64, Notification>>,
    next_id: Arc<AtomicU64>,
    timings: NotificationTimings,
    runtime: tokio::runtime::Handle,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    /// Create a center with the page-default timings
    pub fn new() -> Self {
        Self::with_timings(NotificationTimings::default())
    }

    pub fn with_timings(timings: NotificationTimings) -> Self {
        Self {
            live: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            timings,
            runtime: tokio::runtime::Handle::current(),
        }
    }

    /// Raise a notification and start its timers
    ///
    /// Returns the notification id. The caller does not manage the
    /// lifecycle; the spawned task walks the phases and removes the entry
    /// at the end.
    pub fn push(&self, item_label: impl Into<String>, price_text: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            item_label: item_label.into(),
            price_text: price_text.into(),
            phase: NotificationPhase::Entering,
        };

        debug!(
            "Notification {}: {} -> {}",
            id, notification.item_label, notification.price_text
        );
        self.live.insert(id, notification);

        let live = Arc::clone(&self.live);
        let timings = self.timings;

        self.runtime.spawn(async move {
            // Entrance transition on the "next frame"
            tokio::time::sleep(timings.entrance_frame).await;
            if let Some(mut entry) = live.get_mut(&id) {
                entry.phase = NotificationPhase::Visible;
            }

            // Dwell, then start the exit transition
            tokio::time::sleep(timings.dwell).await;
            if let Some(mut entry) = live.get_mut(&id) {
                entry.phase = NotificationPhase::Exiting;
            }

            // Remove once the exit transition has run, if still present
            tokio::time::sleep(timings.exit).await;
            if live.remove(&id).is_some() {
                debug!("Notification {} removed", id);
            }
        });

        id
    }

    /// Phase of a live notification, or `None` once removed
    pub fn phase_of(&self, id: u64) -> Option<NotificationPhase> {
        self.live.get(&id).map(|entry| entry.phase)
    }

    /// Number of live notifications (any phase)
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Snapshot of the live notifications, unordered
    pub fn snapshot(&self) -> Vec<Notification> {
        self.live.iter().map(|entry| entry.value().clone()).collect()
    }
}
