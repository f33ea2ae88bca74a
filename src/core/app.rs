use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::client::Client;
use crate::common::{error, info};
use crate::core::gate::GatePolicy;
use crate::core::identity::{IdentityProvider, MemoryIdentityProvider};
use crate::core::middleware::{Dispatcher, MiddlewareChain};
use crate::core::route::RouteTable;
use crate::core::session::{MountedSession, SessionResolver};
use crate::core::store::{DocumentStore, MemoryStore};
use crate::core::{Config, Session, UnitOfWork};

/// Assembles an [`App`] from configuration and the two external seams.
///
/// Missing seams fall back to the in-memory implementations.
#[derive(Default)]
pub struct Builder {
    config: Option<Config>,
    provider: Option<Arc<dyn IdentityProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
    request_channel_buffer: usize,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            request_channel_buffer: 1024,
            ..Default::default()
        }
    }

    pub fn from_config(config: Config) -> Self {
        let mut builder = Builder::new();
        builder.config = Some(config);
        builder
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Mount the session and wire the request pipeline.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> App {
        let config = self.config.unwrap_or_default();
        let provider: Arc<dyn IdentityProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(MemoryIdentityProvider::new()),
        };
        let store: Arc<dyn DocumentStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };

        let routes = Arc::new(match config.routes {
            Some(routes) => RouteTable::new(routes),
            None => RouteTable::default(),
        });
        let policy = Arc::new(config.gate);

        let session = SessionResolver::new(Arc::clone(&provider), Arc::clone(&store))
            .with_ordering(config.session.ordering)
            .mount();

        let dispatcher = Dispatcher::new(store, provider);
        let middlewares =
            MiddlewareChain::new(Arc::clone(&routes), Arc::clone(&policy), dispatcher);

        let (send, recv) = mpsc::channel(self.request_channel_buffer.max(1));

        App {
            request_send: send,
            request_recv: recv,
            middlewares,
            session,
            routes,
            policy,
        }
    }
}

/// Mounted application: the resolved session plus the request pipeline that
/// serves clients.
pub struct App {
    request_recv: Receiver<UnitOfWork>,
    request_send: Sender<UnitOfWork>,
    middlewares: MiddlewareChain,
    session: MountedSession,
    routes: Arc<RouteTable>,
    policy: Arc<GatePolicy>,
}

impl App {
    pub fn client(&self) -> Client {
        Client::new(
            self.request_send.clone(),
            self.session.handle(),
            Arc::clone(&self.routes),
            Arc::clone(&self.policy),
        )
    }

    pub fn session(&self) -> Session {
        self.session.session()
    }

    /// Serve requests until `shutdown` completes, then unmount the session.
    pub async fn run(self, shutdown: impl Future) {
        let App {
            mut request_recv,
            request_send,
            mut middlewares,
            session,
            ..
        } = self;
        // Clients keep the channel open.
        drop(request_send);

        info!("App running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                request = request_recv.recv() => match request {
                    Some(uow) => {
                        if let Err(err) = middlewares.apply(uow).await {
                            error!("Handle request {}", err);
                        }
                    }
                    None => break,
                },
            }
        }

        session.unmount().await;
    }
}
