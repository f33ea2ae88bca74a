//! Store doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

use crate::core::store::{collection, Document, DocumentStore, Filter, MemoryStore};
use crate::{HrkitError, Result};

pub(crate) fn profile(role: &str) -> Document {
    match json!({ "role": role }) {
        serde_json::Value::Object(document) => document,
        _ => unreachable!(),
    }
}

pub(crate) async fn seed_profile(store: &MemoryStore, uid: &str, role: &str) {
    store
        .set(collection::USERS, uid, profile(role))
        .await
        .unwrap();
}

/// Memory store whose reads of selected ids block until released.
#[derive(Default)]
pub(crate) struct SlowStore {
    pub(crate) inner: MemoryStore,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    started: AtomicUsize,
}

impl SlowStore {
    pub(crate) fn hold(&self, id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds.lock().insert(id.to_owned(), Arc::clone(&notify));
        notify
    }

    pub(crate) fn started_reads(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let hold = self.holds.lock().get(id).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.inner.get(collection, id).await
    }
    async fn set(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        self.inner.set(collection, id, fields).await
    }
    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        self.inner.update(collection, id, fields).await
    }
    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete(collection, id).await
    }
    async fn add(&self, collection: &str, fields: Document) -> Result<String> {
        self.inner.add(collection, fields).await
    }
    async fn query(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<(String, Document)>> {
        self.inner.query(collection, filter).await
    }
}

/// Store that fails every request.
pub(crate) struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(HrkitError::Store("unavailable".to_owned()))
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _: &str, _: &str) -> Result<Option<Document>> {
        unavailable()
    }
    async fn set(&self, _: &str, _: &str, _: Document) -> Result<()> {
        unavailable()
    }
    async fn update(&self, _: &str, _: &str, _: Document) -> Result<()> {
        unavailable()
    }
    async fn delete(&self, _: &str, _: &str) -> Result<()> {
        unavailable()
    }
    async fn add(&self, _: &str, _: Document) -> Result<String> {
        unavailable()
    }
    async fn query(&self, _: &str, _: Option<&Filter>) -> Result<Vec<(String, Document)>> {
        unavailable()
    }
}
