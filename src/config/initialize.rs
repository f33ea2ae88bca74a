use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::fs;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::client::Client;
use crate::common::{debug, info, ErrorKind, Result};
use crate::config::Config;
use crate::core::identity::MemoryIdentityProvider;
use crate::core::store::{DocumentStore, MemoryStore};
use crate::core::{self, ResolveOrdering};
use crate::HrkitError;

/// Loads configuration, seeds the in-memory adapters and launches the app.
#[derive(Debug)]
pub struct Initializer {
    pub(crate) config: Config,
}

impl Initializer {
    pub async fn load_config_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        Initializer::load(path).await.map_err(HrkitError::from)
    }

    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path=%path.display(), "Load config");
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(Self { config })
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn set_ordering(&mut self, mut ordering: Option<ResolveOrdering>) {
        self.config.app.set_ordering(&mut ordering);
    }

    pub fn set_case_insensitive_roles(&mut self, mut case_insensitive: Option<bool>) {
        self.config
            .app
            .set_case_insensitive_roles(&mut case_insensitive);
    }

    async fn seed(&self, provider: &MemoryIdentityProvider, store: &MemoryStore) -> Result<()> {
        for account in &self.config.seed.accounts {
            provider.add_account(
                account.uid.as_str(),
                account.email.as_str(),
                account.password.as_str(),
            );
        }

        for (collection, documents) in &self.config.seed.documents {
            for (id, document) in documents {
                let document = match document {
                    Value::Object(document) => document.clone(),
                    _ => {
                        return Err(ErrorKind::Seed {
                            description: format!("{}/{} is not an object", collection, id),
                        }
                        .into())
                    }
                };
                store.set(collection, id, document).await?;
            }
        }

        info!(
            accounts = self.config.seed.accounts.len(),
            collections = self.config.seed.documents.len(),
            "Seeded"
        );
        Ok(())
    }

    /// Seed the in-memory adapters and start serving on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn launch(self) -> crate::Result<Running> {
        let provider = MemoryIdentityProvider::new();
        let store = MemoryStore::new();
        self.seed(&provider, &store).await?;

        let app = core::Builder::from_config(self.config.app)
            .identity_provider(Arc::new(provider))
            .document_store(Arc::new(store.clone()))
            .build();
        let client = app.client();

        let shutdown = Arc::new(Notify::new());
        let notified = Arc::clone(&shutdown);
        let task = tokio::spawn(app.run(async move { notified.notified().await }));

        Ok(Running {
            client,
            store,
            shutdown,
            task,
        })
    }
}

/// Handle to an app launched by [`Initializer::launch`].
pub struct Running {
    client: Client,
    store: MemoryStore,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl Running {
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Stop serving and wait until the session has been unmounted.
    pub async fn shutdown(self) -> crate::Result<()> {
        self.shutdown.notify_one();
        self.task
            .await
            .map_err(|err| HrkitError::Internal(format!("app task. {}", err)))
    }
}
