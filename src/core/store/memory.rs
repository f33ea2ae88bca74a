use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::common::trace;
use crate::core::store::{Document, DocumentStore, Filter};
use crate::{HrkitError, Result};

type Collection = BTreeMap<String, Document>;

/// Document store kept in process memory.
///
/// Clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in the collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        trace!(collection, id, "Get document");
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        trace!(collection, id, "Set document");
        self.collections
            .write()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        trace!(collection, id, "Update document");
        let mut collections = self.collections.write();
        match collections.get_mut(collection).and_then(|c| c.get_mut(id)) {
            Some(document) => {
                document.extend(fields);
                Ok(())
            }
            None => Err(HrkitError::DocumentNotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            }),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        trace!(collection, id, "Delete document");
        if let Some(c) = self.collections.write().get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Document) -> Result<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.set(collection, &id, fields).await?;
        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<(String, Document)>> {
        trace!(collection, ?filter, "Query documents");
        let collections = self.collections.read();
        let documents = match collections.get(collection) {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };

        Ok(documents
            .iter()
            .filter(|(_, document)| filter.map_or(true, |f| f.matches(document)))
            .map(|(id, document)| (id.clone(), document.clone()))
            .collect())
    }
}
