//! End-to-end price flow tests
//!
//! Runs a real WebSocket server on a loopback port, points the watcher at
//! it, and checks that pushed frames end up patched into the page model and
//! surfaced as notifications.

use auction::domain::money::format_currency;
use auction::notify::{NotificationCenter, NotificationTimings};
use auction::page::InMemoryPage;
use auction::spawn_price_watcher;
use auction::PageLocation;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

/// Start a loopback feed server.
///
/// Returns the host:port to point the watcher at and a broadcast sender;
/// every text frame sent on it is pushed to all connected clients.
async fn start_feed_server() -> (String, broadcast::Sender<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (frame_tx, _) = broadcast::channel::<String>(64);

    let accept_tx = frame_tx.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let mut frames = accept_tx.subscribe();
            tokio::spawn(async move {
                let ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
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
            });
        }
    });

    (format!("127.0.0.1:{}", addr.port()), frame_tx)
}

fn fast_timings() -> NotificationTimings {
    NotificationTimings {
        entrance_frame: Duration::from_millis(1),
        dwell: Duration::from_millis(500),
        exit: Duration::from_millis(50),
    }
}

fn price_frame(item_id: &str, name: &str, price: f64) -> String {
    format!(
        r#"{{"type":"priceUpdate","itemId":"{}","itemName":"{}","price":{}}}"#,
        item_id, name, price
    )
}

/// Keep re-sending a frame until the condition holds or the deadline passes.
///
/// The client connects asynchronously, so early frames can be broadcast to
/// nobody; resending makes the test independent of connect timing.
async fn push_until(
    frames: &broadcast::Sender<String>,
    frame: &str,
    mut done: impl FnMut() -> bool,
) -> bool {
    for _ in 0..200 {
        let _ = frames.send(frame.to_string());
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn updates_flow_from_socket_to_page() {
    let (host, frames) = start_feed_server().await;

    let page = Arc::new(InMemoryPage::new("/items"));
    page.insert_item("vinyl-042", format_currency(100.0));
    page.insert_item("comic-007", format_currency(55.0));

    let notifications = NotificationCenter::with_timings(fast_timings());
    let shutdown = Arc::new(AtomicBool::new(true));

    let applied = spawn_price_watcher(
        PageLocation::new(&host, false),
        Arc::clone(&page),
        notifications.clone(),
        Arc::clone(&shutdown),
    )
    .await
    .unwrap();

    let frame = price_frame("vinyl-042", "Signed LP", 150.0);
    let patched = push_until(&frames, &frame, || {
        page.list_price("vinyl-042") == Some("$150,00".to_string())
    })
    .await;

    assert!(patched, "update never reached the page");
    // The untouched item keeps its seeded price
    assert_eq!(page.list_price("comic-007"), Some("$55,00".to_string()));
    assert!(applied.load(Ordering::Relaxed) >= 1);
    assert!(notifications.live_count() >= 1);

    shutdown.store(false, Ordering::Release);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_frames_do_not_stop_the_flow() {
    let (host, frames) = start_feed_server().await;

    let page = Arc::new(InMemoryPage::new("/items"));
    page.insert_item("vinyl-042", format_currency(100.0));

    let notifications = NotificationCenter::with_timings(fast_timings());
    let shutdown = Arc::new(AtomicBool::new(true));

    spawn_price_watcher(
        PageLocation::new(&host, false),
        Arc::clone(&page),
        notifications,
        Arc::clone(&shutdown),
    )
    .await
    .unwrap();

    // Get the first update through, proving the client is connected
    let first = price_frame("vinyl-042", "Signed LP", 110.0);
    assert!(
        push_until(&frames, &first, || {
            page.list_price("vinyl-042") == Some("$110,00".to_string())
        })
        .await
    );

    // Garbage and unknown types ride the same connection
    let _ = frames.send("not json at all".to_string());
    let _ = frames.send(r#"{"itemId":"x"}"#.to_string());
    let _ = frames.send(r#"{"type":"bidPlaced","itemId":"vinyl-042"}"#.to_string());

    // A later valid update still lands
    let second = price_frame("vinyl-042", "Signed LP", 125.5);
    assert!(
        push_until(&frames, &second, || {
            page.list_price("vinyl-042") == Some("$125,50".to_string())
        })
        .await
    );

    shutdown.store(false, Ordering::Release);
}

#[tokio::test(flavor = "multi_thread")]
async fn detail_page_only_tracks_its_own_item() {
    let (host, frames) = start_feed_server().await;

    let page = Arc::new(InMemoryPage::new("/items/comic-007"));
    page.set_detail_node(format_currency(55.0));

    let notifications = NotificationCenter::with_timings(fast_timings());
    let shutdown = Arc::new(AtomicBool::new(true));

    spawn_price_watcher(
        PageLocation::new(&host, false),
        Arc::clone(&page),
        notifications,
        Arc::clone(&shutdown),
    )
    .await
    .unwrap();

    // This item's update patches the detail node
    let own = price_frame("comic-007", "Comic #7", 60.5);
    assert!(
        push_until(&frames, &own, || {
            page.detail_price() == Some("$60,50".to_string())
        })
        .await
    );

    // Another item's update leaves it alone
    let other = price_frame("vinyl-042", "Signed LP", 999.0);
    for _ in 0..10 {
        let _ = frames.send(other.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(page.detail_price(), Some("$60,50".to_string()));

    shutdown.store(false, Ordering::Release);
}
