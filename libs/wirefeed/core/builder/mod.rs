pub mod states;

use crate::client::SocketClient;
use crate::config::ClientConfig;
use crate::traits::*;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use states::*;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

type RouteSenders<R> =
    HashMap<<R as MessageRouter>::RouteKey, Sender<<R as MessageRouter>::Message>>;
type HandlerThreads = Vec<std::thread::JoinHandle<()>>;

// The routing closure is erased to Box<dyn Any> so the builder struct does
// not need the router's associated types in its own generics until build()
type HandlerBuilderFn<R> =
    Box<dyn FnOnce(Arc<AtomicBool>) -> (RouteSenders<R>, HandlerThreads) + Send>;

/// Type-state builder for [`SocketClient`]
///
/// The URL and the router are required; forgetting either is a compile
/// error rather than a runtime one. Handlers are registered per route key
/// inside the `router()` call.
pub struct SocketClientBuilder<U, Ro, R, M>
where
    U: UrlState,
    Ro: RouterState,
{
    _state: TypeState<U, Ro>,
    _router_type: PhantomData<R>,
    _message_type: PhantomData<M>,
    url: Option<String>,
    router: Option<R>,
    handler_builder: Option<Box<dyn std::any::Any + Send>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl SocketClientBuilder<NoUrl, NoRouter, (), ()> {
    /// Start an empty builder
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            _router_type: PhantomData,
            _message_type: PhantomData,
            url: None,
            router: None,
            handler_builder: None,
            reconnect_strategy: None,
            shutdown_flag: None,
        }
    }
}

impl Default for SocketClientBuilder<NoUrl, NoRouter, (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ro, R, M> SocketClientBuilder<NoUrl, Ro, R, M>
where
    Ro: RouterState,
{
    /// Set the WebSocket endpoint (ws:// or wss://)
    pub fn url(self, url: impl Into<String>) -> SocketClientBuilder<HasUrl, Ro, R, M> {
        SocketClientBuilder {
            _state: TypeState::new(),
            _router_type: PhantomData,
            _message_type: PhantomData,
            url: Some(url.into()),
            router: self.router,
            handler_builder: self.handler_builder,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

/// Registers one handler (and the channel feeding it) per route key
pub struct RoutingBuilder<R>
where
    R: MessageRouter,
{
    #[allow(clippy::type_complexity)]
    handlers: HashMap<
        R::RouteKey,
        (
            Sender<R::Message>,
            Receiver<R::Message>,
            Box<dyn MessageHandler<R::Message>>,
        ),
    >,
}

impl<R> RoutingBuilder<R>
where
    R: MessageRouter,
{
    fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Attach a handler to one route key
    pub fn handler<H>(mut self, route_key: R::RouteKey, handler: H) -> Self
    where
        H: MessageHandler<R::Message>,
    {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.handlers
            .insert(route_key, (sender, receiver, Box::new(handler)));
        self
    }

    fn build(self, shutdown_flag: Arc<AtomicBool>) -> (RouteSenders<R>, HandlerThreads) {
        let mut senders = HashMap::new();
        let mut handles = Vec::new();

        for (route_key, (sender, receiver, handler)) in self.handlers {
            senders.insert(route_key.clone(), sender);
            handles.push(spawn_handler_thread(
                route_key,
                receiver,
                handler,
                Arc::clone(&shutdown_flag),
            ));
        }

        (senders, handles)
    }
}

/// Run a handler on its own OS thread until its channel closes or the
/// shutdown flag clears. The short recv timeout is what makes the flag
/// check responsive.
fn spawn_handler_thread<K, M>(
    route_key: K,
    receiver: Receiver<M>,
    mut handler: Box<dyn MessageHandler<M>>,
    shutdown_flag: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()>
where
    K: std::fmt::Debug + Send + 'static,
    M: Send + std::fmt::Debug + 'static,
{
    std::thread::spawn(move || loop {
        match receiver.recv_timeout(Duration::from_millis(50)) {
            Ok(message) => {
                if let Err(e) = handler.handle(message) {
                    error!("Handler error for route {:?}: {}", route_key, e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !shutdown_flag.load(Ordering::Acquire) {
                    debug!("Handler thread for route {:?} stopping on shutdown", route_key);
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Channel for route {:?} closed, handler thread done", route_key);
                break;
            }
        }
    })
}

impl<U> SocketClientBuilder<U, NoRouter, (), ()>
where
    U: UrlState,
{
    /// Set the router and register its handlers
    ///
    /// The closure receives a [`RoutingBuilder`] and must attach one handler
    /// per route key the router can produce. Channel creation and thread
    /// spawning are deferred to `build()`.
    pub fn router<NewR, F>(
        self,
        router: NewR,
        configure_routing: F,
    ) -> SocketClientBuilder<U, HasRouter, NewR, NewR::Message>
    where
        NewR: MessageRouter,
        F: FnOnce(RoutingBuilder<NewR>) -> RoutingBuilder<NewR> + Send + 'static,
    {
        let routing = configure_routing(RoutingBuilder::<NewR>::new());

        let handler_builder: HandlerBuilderFn<NewR> =
            Box::new(move |shutdown_flag: Arc<AtomicBool>| routing.build(shutdown_flag));
        let handler_builder_any = Box::new(handler_builder) as Box<dyn std::any::Any + Send>;

        SocketClientBuilder {
            _state: TypeState::new(),
            _router_type: PhantomData,
            _message_type: PhantomData,
            url: self.url,
            router: Some(router),
            handler_builder: Some(handler_builder_any),
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

impl<U, R> SocketClientBuilder<U, HasRouter, R, R::Message>
where
    U: UrlState,
    R: MessageRouter,
{
    /// Override the default reconnection strategy (fixed 5s, retry forever)
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Share a shutdown flag with other components
    ///
    /// The client makes its own flag when none is given. Storing `false`
    /// stops reconnection and lets every thread wind down.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

// build() exists only once both required fields are present
impl<R> SocketClientBuilder<HasUrl, HasRouter, R, R::Message>
where
    R: MessageRouter,
{
    pub async fn build(self) -> Result<SocketClient<R, R::Message>> {
        let url = self.url.expect("URL must be set");
        let router = Arc::new(self.router.expect("Router must be set"));

        let shutdown_flag = self
            .shutdown_flag
            .unwrap_or_else(|| Arc::new(AtomicBool::new(true)));

        let reconnect_strategy = self
            .reconnect_strategy
            .unwrap_or_else(|| Box::new(FixedDelay::new(Duration::from_secs(5), None)));

        let (route_senders, handler_handles) = match self.handler_builder {
            Some(builder_any) => {
                let builder = builder_any.downcast::<HandlerBuilderFn<R>>().map_err(|_| {
                    WirefeedError::Configuration("Handler builder type mismatch".into())
                })?;
                (*builder)(Arc::clone(&shutdown_flag))
            }
            None => (HashMap::new(), Vec::new()),
        };

        let config = ClientConfig {
            url,
            router,
            route_senders,
            reconnect_strategy,
            shutdown_flag,
        };

        let mut client = SocketClient::new(config).await?;
        client.handler_handles = handler_handles;

        Ok(client)
    }
}
