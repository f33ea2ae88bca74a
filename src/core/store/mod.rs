//! Document store seam.
//!
//! Documents are JSON objects grouped into named collections and addressed by
//! id. Only equality filters are supported, which is all the HR services
//! need.

mod memory;
pub use self::memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{HrkitError, Result};

pub type Document = serde_json::Map<String, Value>;

pub mod collection {
    pub const USERS: &str = "users";
    pub const DEPARTMENTS: &str = "departments";
    pub const ROLES: &str = "roles";
    pub const AUDIT_LOGS: &str = "auditLogs";
}

/// Field equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;
    /// Create or overwrite the document.
    async fn set(&self, collection: &str, id: &str, fields: Document) -> Result<()>;
    /// Merge fields into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()>;
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
    /// Insert under a generated id and return it.
    async fn add(&self, collection: &str, fields: Document) -> Result<String>;
    async fn query(&self, collection: &str, filter: Option<&Filter>)
        -> Result<Vec<(String, Document)>>;
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(document) => Ok(document),
        other => Err(HrkitError::InvalidDocument {
            description: format!("expected an object, got {}", other),
        }),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
