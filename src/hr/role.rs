use serde::{Deserialize, Serialize};

use crate::common::info;
use crate::core::store::{collection, from_document, to_document, DocumentStore};
use crate::core::Principal;
use crate::hr::audit::{self, AuditRecord};
use crate::hr::department::split_list;
use crate::{HrkitError, Result};

/// Document of the `roles` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleRecord {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
    pub description: String,
}

/// Role form input. `permissions` is a comma separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewRole {
    pub name: String,
    pub permissions: String,
    pub description: String,
}

/// Lower-cased name with every whitespace run replaced by `_`.
pub fn role_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                id.push('_');
            }
            in_whitespace = true;
        } else {
            id.push(c);
            in_whitespace = false;
        }
    }
    id
}

pub async fn add(store: &dyn DocumentStore, actor: &Principal, role: &NewRole) -> Result<String> {
    if role.name.trim().is_empty() {
        return Err(HrkitError::InvalidInput("role name is required".to_owned()));
    }

    let record = RoleRecord {
        id: role_id(&role.name),
        name: role.name.clone(),
        permissions: split_list(&role.permissions),
        description: role.description.clone(),
    };
    store
        .set(collection::ROLES, &record.id, to_document(&record)?)
        .await?;

    let entry = AuditRecord::new(format!("New Role added by {}", actor.email))
        .by(actor)
        .action_user(record.id.as_str(), actor.email.as_str());
    audit::record(store, &entry).await?;

    info!(id=%record.id, "Role added");
    Ok(record.id)
}

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<RoleRecord>> {
    store
        .query(collection::ROLES, None)
        .await?
        .into_iter()
        .map(|(id, document)| {
            let mut role: RoleRecord = from_document(document)?;
            role.id = id;
            Ok(role)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    #[test]
    fn id_from_name() {
        assert_eq!(role_id("Team Lead"), "team_lead");
        assert_eq!(role_id("Senior  \tDev"), "senior_dev");
        assert_eq!(role_id(" Admin"), "_admin");
    }

    #[test]
    fn add_and_list() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();
            let actor = Principal::new("admin-1", "admin@example.com");
            let form = NewRole {
                name: "Team Lead".into(),
                permissions: "read, write".into(),
                description: "Leads a team".into(),
            };

            let id = add(&store, &actor, &form).await.unwrap();
            assert_eq!(id, "team_lead");

            let roles = list(&store).await.unwrap();
            assert_eq!(roles.len(), 1);
            assert_eq!(roles[0].permissions, vec!["read".to_owned(), "write".to_owned()]);

            let records = audit::list(&store).await.unwrap();
            assert_eq!(records[0].action, "New Role added by admin@example.com");
            assert_eq!(records[0].user_id, "admin-1");
        })
    }
}
