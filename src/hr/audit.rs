use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::warn;
use crate::core::store::{collection, from_document, to_document, DocumentStore};
use crate::core::Principal;
use crate::Result;

/// Entry of the `auditLogs` collection.
///
/// `user_*` and `action_user_*` name the two parties of the action. Which one
/// is the actor depends on the action that wrote the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub action_user_id: String,
    #[serde(default)]
    pub action_user_email: String,
}

impl AuditRecord {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            timestamp: Utc::now(),
            user_id: String::new(),
            user_email: String::new(),
            action_user_id: String::new(),
            action_user_email: String::new(),
        }
    }

    pub fn user(mut self, id: impl Into<String>, email: impl Into<String>) -> Self {
        self.user_id = id.into();
        self.user_email = email.into();
        self
    }

    pub fn action_user(mut self, id: impl Into<String>, email: impl Into<String>) -> Self {
        self.action_user_id = id.into();
        self.action_user_email = email.into();
        self
    }

    pub(crate) fn by(self, actor: &Principal) -> Self {
        self.user(actor.uid.as_str(), actor.email.as_str())
    }
}

pub async fn record(store: &dyn DocumentStore, record: &AuditRecord) -> Result<String> {
    store
        .add(collection::AUDIT_LOGS, to_document(record)?)
        .await
}

/// All audit records, newest first. Entries that do not parse are skipped.
pub async fn list(store: &dyn DocumentStore) -> Result<Vec<AuditRecord>> {
    let mut records = store
        .query(collection::AUDIT_LOGS, None)
        .await?
        .into_iter()
        .filter_map(|(id, document)| match from_document::<AuditRecord>(document) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%id, %err, "Skip malformed audit record");
                None
            }
        })
        .collect::<Vec<_>>();

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use chrono::Duration;

    #[test]
    fn list_newest_first() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();
            let mut older = AuditRecord::new("first");
            older.timestamp = Utc::now() - Duration::minutes(5);
            record(&store, &older).await.unwrap();
            record(&store, &AuditRecord::new("second").user("u1", "a@example.com"))
                .await
                .unwrap();

            let records = list(&store).await.unwrap();
            let actions: Vec<_> = records.iter().map(|r| r.action.as_str()).collect();
            assert_eq!(actions, vec!["second", "first"]);
            assert_eq!(records[0].user_email, "a@example.com");
        })
    }

    #[test]
    fn stored_with_camel_case_fields() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();
            let id = record(&store, &AuditRecord::new("x").action_user("d1", "a@example.com"))
                .await
                .unwrap();

            let document = store
                .get(collection::AUDIT_LOGS, &id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                document.get("actionUserId"),
                Some(&serde_json::Value::from("d1"))
            );
            assert!(document.contains_key("timestamp"));
        })
    }
}
