//! Common test utilities for wirefeed integration tests

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};

/// A mock feed server for testing
///
/// Accepts WebSocket connections and pushes text frames to every connected
/// client. Can drop all live connections on demand to exercise the
/// reconnect cycle.
pub struct MockFeedServer {
    pub addr: SocketAddr,
    frames: broadcast::Sender<String>,
    kick: Arc<Notify>,
    shutdown: Arc<Notify>,
    accepted: Arc<AtomicUsize>,
}

impl MockFeedServer {
    /// Create and start a new mock feed server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (frames, _) = broadcast::channel(64);
        let kick = Arc::new(Notify::new());
        let shutdown = Arc::new(Notify::new());
        let accepted = Arc::new(AtomicUsize::new(0));

        let frames_tx = frames.clone();
        let kick_accept = Arc::clone(&kick);
        let shutdown_accept = Arc::clone(&shutdown);
        let accepted_count = Arc::clone(&accepted);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                accepted_count.fetch_add(1, Ordering::SeqCst);
                                let frames_rx = frames_tx.subscribe();
                                let kick = Arc::clone(&kick_accept);
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, frames_rx, kick).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_accept.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            frames,
            kick,
            shutdown,
            accepted,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        mut frames_rx: broadcast::Receiver<String>,
        kick: Arc<Notify>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                frame = frames_rx.recv() => {
                    match frame {
                        Ok(text) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                msg = read.next() => {
                    match msg {
                        // Echo text/binary so send() can be exercised
                        Some(Ok(msg)) if msg.is_text() || msg.is_binary() => {
                            if write.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(msg)) if msg.is_close() => break,
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    }
                }
                _ = kick.notified() => {
                    // Drop the connection without a close handshake
                    break;
                }
            }
        }
    }

    /// ws:// URL clients should dial
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Push a text frame to every connected client
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.frames.send(frame.into());
    }

    /// Number of connections accepted so far
    pub fn connections_accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Drop all live connections (clients should reconnect)
    pub fn drop_connections(&self) {
        self.kick.notify_waiters();
    }

    /// Stop accepting and kick every client
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
        self.kick.notify_waiters();
    }
}

impl Drop for MockFeedServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
