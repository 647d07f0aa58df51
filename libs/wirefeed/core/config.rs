use crate::traits::*;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Configuration for a [`SocketClient`](crate::SocketClient)
///
/// Holds everything needed to run a client with message routing. Built via
/// the type-state builder, never constructed directly.
pub struct ClientConfig<R, M>
where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    /// Feed URL (ws:// or wss://)
    pub(crate) url: String,

    /// Router for parsing and routing frames
    pub(crate) router: Arc<R>,

    /// Channel senders mapped by route key
    pub(crate) route_senders: HashMap<R::RouteKey, crossbeam_channel::Sender<M>>,

    /// Decides whether and when to reconnect after closure
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// True while the client should keep running
    pub(crate) shutdown_flag: Arc<AtomicBool>,
}

impl<R, M> ClientConfig<R, M>
where
    R: MessageRouter<Message = M>,
    M: Send + std::fmt::Debug + 'static,
{
    /// Feed endpoint this client connects to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of registered route handlers
    pub fn handler_count(&self) -> usize {
        self.route_senders.len()
    }
}
