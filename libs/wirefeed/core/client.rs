use crate::config::ClientConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::traits::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Control messages from the handle to the I/O task
#[derive(Debug)]
enum ClientCommand {
    /// Write a frame to the socket
    Send(WsMessage),
    /// Stop the I/O task
    Shutdown,
}

/// Lifecycle events surfaced by the client
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Handshake completed, connection is open
    Connected,
    /// Transport closed (server close or network failure)
    Disconnected,
    /// Reconnect attempt scheduled (attempt number)
    Reconnecting(usize),
    /// Non-fatal error (reported, does not itself force closure)
    Error(String),
}

/// Point-in-time counter snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_received: u64,
    pub messages_sent: u64,
    pub messages_dropped: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// WebSocket client for a server-pushed event feed
///
/// Keeps exactly one logical connection alive for its own lifetime:
/// - Explicit `Connecting -> Open -> Closed` state machine
/// - Reconnects after closure per the configured strategy; only the
///   connection as a whole is retried, never individual messages
/// - Each frame is parsed in a spawned task and routed to a handler thread;
///   a malformed frame is logged and dropped without touching the connection
///
/// `R` is the router; `M` is the message type it produces.
pub struct SocketClient<R, M>
where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    /// Held until shutdown; dropping it closes the route channels
    config: Arc<ClientConfig<R, M>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_tx: Sender<ClientCommand>,
    event_rx: Receiver<ClientEvent>,
    /// Async I/O task
    task_handle: Option<tokio::task::JoinHandle<()>>,
    /// Dedicated OS threads running the message handlers
    pub(crate) handler_handles: Vec<std::thread::JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
}

impl<R, M> SocketClient<R, M>
where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    /// Create a new client from configuration
    ///
    /// Called by the builder's `build()` method; use `wirefeed::builder()`.
    pub(crate) async fn new(config: ClientConfig<R, M>) -> Result<Self> {
        let config = Arc::new(config);
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Closed));
        let metrics = Arc::new(AtomicMetrics::new());
        let shutdown_flag = Arc::clone(&config.shutdown_flag);

        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        let task_handle = {
            let config = Arc::clone(&config);
            let state = Arc::clone(&state);
            let metrics = Arc::clone(&metrics);

            tokio::spawn(async move {
                run_client(config, state, metrics, command_rx, event_tx).await;
            })
        };

        Ok(Self {
            config,
            state,
            metrics,
            command_tx,
            event_rx,
            task_handle: Some(task_handle),
            handler_handles: Vec::new(), // Builder will populate this
            shutdown_flag,
        })
    }

    /// Send a frame through the WebSocket
    pub fn send(&self, message: WsMessage) -> Result<()> {
        self.command_tx
            .send(ClientCommand::Send(message))
            .map_err(|e| WirefeedError::ChannelSend(e.to_string()))
    }

    /// Current state of the underlying connection
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check if the connection is open
    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Snapshot the counters
    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_received: self.metrics.messages_received(),
            messages_sent: self.metrics.messages_sent(),
            messages_dropped: self.metrics.messages_dropped(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive a lifecycle event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive a lifecycle event (blocking)
    pub fn recv_event(&self) -> std::result::Result<ClientEvent, crossbeam_channel::RecvError> {
        self.event_rx.recv()
    }

    /// The flag that keeps this client alive
    ///
    /// Storing `false` stops reconnection and drains everything down;
    /// the flag is consulted before every reconnect attempt.
    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown_flag
    }

    /// Stop the connection and join every handler thread
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down feed client");

        // Prevent reconnection, then stop the active connection
        self.shutdown_flag.store(false, Ordering::Release);
        self.state.set(ConnectionState::ShuttingDown);

        let _ = self.command_tx.send(ClientCommand::Shutdown);

        // Wait for the main I/O task; this stops new frames arriving
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }

        // Give in-flight parse tasks a moment to finish or be discarded
        debug!("Waiting 100ms for in-flight parse tasks to complete");
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Dropping the config drops the route senders, which closes the
        // handler channels and lets the handler threads exit
        drop(self.config);

        debug!(
            "Waiting for {} handler threads to complete",
            self.handler_handles.len()
        );
        for handle in self.handler_handles {
            let _ = handle.join();
        }

        info!("All handlers shut down");
        Ok(())
    }
}

fn stop_requested(shutdown_flag: &AtomicBool, state: &AtomicConnectionState) -> bool {
    !shutdown_flag.load(Ordering::Acquire) || state.is_shutting_down()
}

/// Main client task loop: drives the Connecting -> Open -> Closed cycle
async fn run_client<R, M>(
    config: Arc<ClientConfig<R, M>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_rx: Receiver<ClientCommand>,
    event_tx: Sender<ClientEvent>,
) where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    let mut reconnect_attempt = 0;

    loop {
        if stop_requested(&config.shutdown_flag, &state) {
            debug!("Stop requested, exiting main loop");
            break;
        }

        state.set(ConnectionState::Connecting);
        if reconnect_attempt > 0 {
            let _ = event_tx.send(ClientEvent::Reconnecting(reconnect_attempt));
        }

        match connect_async(&config.url).await {
            Ok((ws_stream, _)) => {
                info!("Feed connection open: {}", config.url);
                state.set(ConnectionState::Open);
                let _ = event_tx.send(ClientEvent::Connected);

                // A completed handshake restarts the attempt count
                reconnect_attempt = 0;

                // Errors inside an open connection are reported; closure is
                // driven only by the transport's own close signal
                if let Err(e) = message_loop(
                    ws_stream,
                    Arc::clone(&config),
                    Arc::clone(&state),
                    Arc::clone(&metrics),
                    &command_rx,
                )
                .await
                {
                    error!("Feed connection failed: {}", e);
                    let _ = event_tx.send(ClientEvent::Error(e.to_string()));
                }

                state.set(ConnectionState::Closed);
                let _ = event_tx.send(ClientEvent::Disconnected);
            }
            Err(e) => {
                error!("Could not reach {}: {}", config.url, e);
                let _ = event_tx.send(ClientEvent::Error(e.to_string()));
                state.set(ConnectionState::Closed);
            }
        }

        if stop_requested(&config.shutdown_flag, &state) {
            debug!("Stop requested after closure, not reconnecting");
            break;
        }

        let Some(delay) = config.reconnect_strategy.next_delay(reconnect_attempt) else {
            warn!("Reconnection strategy exhausted, stopping");
            break;
        };

        info!(
            "Reconnecting in {:?} (attempt {})",
            delay,
            reconnect_attempt + 1
        );

        // Sleep in short slices so shutdown interrupts the delay
        let check_interval = Duration::from_millis(100);
        let mut remaining = delay;
        while !remaining.is_zero() {
            if !config.shutdown_flag.load(Ordering::Acquire) {
                debug!("Shutdown flag set during reconnection delay");
                return;
            }

            let slice = check_interval.min(remaining);
            tokio::time::sleep(slice).await;
            remaining -= slice;
        }

        reconnect_attempt += 1;
        metrics.increment_reconnects();
    }

    info!("Client task exiting");
}

/// Message processing loop for one open connection
async fn message_loop<R, M>(
    ws_stream: WsStream,
    config: Arc<ClientConfig<R, M>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_rx: &Receiver<ClientCommand>,
) -> Result<()>
where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    let (mut write, mut read) = ws_stream.split();

    loop {
        if stop_requested(&config.shutdown_flag, &state) {
            debug!("Stop requested in message loop, closing connection");
            let _ = write.close().await;
            return Ok(());
        }

        tokio::select! {
            // Handle incoming frames
            msg = read.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        metrics.increment_received();

                        if let Some(ws_msg) = tungstenite_to_ws_message(msg) {
                            // Don't queue new work once shutdown has begun
                            if !config.shutdown_flag.load(Ordering::Acquire) {
                                debug!("Shutdown detected, skipping frame parsing");
                                continue;
                            }

                            spawn_parse_task(&config, &metrics, ws_msg);
                        }
                    }
                    Some(Err(e)) => {
                        error!("Socket read failed: {}", e);
                        return Err(WirefeedError::Transport(e.to_string()));
                    }
                    None => {
                        warn!("Server closed the feed stream");
                        return Err(WirefeedError::ConnectionClosed("Stream ended".into()));
                    }
                }
            }

            // Handle commands (spawn_blocking with timeout to avoid blocking select)
            cmd = async {
                let rx = command_rx.clone();
                tokio::task::spawn_blocking(move || {
                    rx.recv_timeout(Duration::from_millis(100))
                }).await.ok()
            } => {
                match cmd {
                    Some(Ok(ClientCommand::Send(msg))) => {
                        let tung_msg = ws_message_to_tungstenite(&msg);
                        write.send(tung_msg).await.map_err(|e| {
                            WirefeedError::Transport(e.to_string())
                        })?;
                        metrics.increment_sent();
                    }
                    Some(Ok(ClientCommand::Shutdown)) => {
                        info!("Shutdown command received, closing connection");
                        state.set(ConnectionState::ShuttingDown);
                        return Ok(());
                    }
                    Some(Err(_)) => {
                        // recv timeout, nothing queued
                    }
                    None => {
                        debug!("Command channel gone, stopping message loop");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Parse a frame off the I/O loop and hand the result to its route channel
fn spawn_parse_task<R, M>(
    config: &Arc<ClientConfig<R, M>>,
    metrics: &Arc<AtomicMetrics>,
    ws_msg: WsMessage,
) where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    let router = Arc::clone(&config.router);
    let route_senders = config.route_senders.clone();
    let metrics = Arc::clone(metrics);
    let shutdown_flag = Arc::clone(&config.shutdown_flag);

    tokio::spawn(async move {
        match router.parse(ws_msg).await {
            Ok(message) => {
                // Don't route frames parsed after shutdown began
                if !shutdown_flag.load(Ordering::Acquire) {
                    debug!("Shutdown detected after parse, discarding message");
                    return;
                }

                let route_key = router.route_key(&message);
                match route_senders.get(&route_key) {
                    // A send failure means the channel closed, which only
                    // happens during shutdown
                    Some(sender) => {
                        let _ = sender.send(message);
                    }
                    None => warn!("No handler configured for route key: {:?}", route_key),
                }
            }
            Err(e) => {
                // Malformed payload: dropped, connection unaffected
                error!("Parse error: {}", e);
                metrics.increment_dropped();
            }
        }
    });
}

fn ws_message_to_tungstenite(msg: &WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text.clone()),
        WsMessage::Binary(data) => Message::Binary(data.clone()),
    }
}

/// Control frames carry no payload for the router and map to `None`
fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
