//! Message routing
//!
//! Frames pulled off the socket are parsed into typed messages and routed
//! to a handler by route key: socket, then router, then a per-key channel,
//! then the handler's own thread.
//!
//! Messages sharing a route key are handled sequentially in delivery order;
//! distinct route keys run on separate threads. A parse failure is logged
//! and the frame dropped without touching the connection.

use crate::{Result, WsMessage};
use async_trait::async_trait;
use std::fmt::Debug;
use std::hash::Hash;

/// Turns raw frames into typed messages and decides where each one goes
///
/// A router does two things: decode the frame, and name the route that
/// should receive the decoded message. For example:
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum FeedRoute {
///     Updates,
/// }
///
/// #[derive(Debug)]
/// enum FeedMessage {
///     PriceUpdate { item_id: String, price: f64 },
///     Ignored(String),
/// }
///
/// struct PriceRouter;
///
/// #[async_trait]
/// impl MessageRouter for PriceRouter {
///     type Message = FeedMessage;
///     type RouteKey = FeedRoute;
///
///     async fn parse(&self, frame: WsMessage) -> Result<FeedMessage> {
///         // decode JSON into a FeedMessage
///     }
///
///     fn route_key(&self, _message: &FeedMessage) -> FeedRoute {
///         FeedRoute::Updates
///     }
/// }
/// ```
#[async_trait]
pub trait MessageRouter: Send + Sync + 'static {
    /// Decoded message type
    type Message: Send + Debug + 'static;

    /// Key that selects the handler for a message
    type RouteKey: Hash + Eq + Clone + Send + Sync + Debug + 'static;

    /// Decode one raw frame
    ///
    /// Called for every frame received from the socket. A returned error is
    /// logged as a parse failure and the frame is dropped; it never closes
    /// the connection.
    async fn parse(&self, message: WsMessage) -> Result<Self::Message>;

    /// Name the route for a decoded message
    ///
    /// Keep this a plain match or field access; it runs on the hot path.
    fn route_key(&self, message: &Self::Message) -> Self::RouteKey;
}

/// Consumes decoded messages for one route, in order
///
/// Handlers run on their own OS thread, receiving messages in the order
/// the router delivered them.
pub trait MessageHandler<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    /// Process one message
    ///
    /// Runs on a dedicated OS thread, not in an async context. An error is
    /// logged and the handler thread continues with subsequent messages.
    fn handle(&mut self, message: M) -> Result<()>;
}
