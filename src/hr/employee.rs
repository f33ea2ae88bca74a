use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::info;
use crate::core::store::{collection, from_document, to_document, DocumentStore};
use crate::core::Principal;
use crate::hr::audit::{self, AuditRecord};
use crate::{HrkitError, Result};

pub(crate) const REGISTER_DATE_FIELD: &str = "registerDate";

/// Profile document of the `users` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    #[serde(skip)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub birthday: String,
    pub department: String,
    pub position: String,
    pub role: String,
    pub joining_date: String,
    pub image_url: String,
    pub register_date: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub birthday: String,
    pub department: String,
    pub position: String,
    pub role: String,
    pub joining_date: String,
    pub image_url: String,
}

/// Editable profile fields. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

pub async fn add(
    store: &dyn DocumentStore,
    actor: &Principal,
    employee: &NewEmployee,
) -> Result<String> {
    if employee.email.trim().is_empty() {
        return Err(HrkitError::InvalidInput("employee email is required".to_owned()));
    }

    let mut document = to_document(employee)?;
    document.insert(
        REGISTER_DATE_FIELD.to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );
    let id = store.add(collection::USERS, document).await?;

    let entry = AuditRecord::new(format!(
        "New User {} is created by {}",
        employee.email, actor.email
    ))
    .user(id.as_str(), employee.email.as_str())
    .action_user(actor.uid.as_str(), actor.email.as_str());
    audit::record(store, &entry).await?;

    info!(%id, email=%employee.email, "Employee added");
    Ok(id)
}

pub async fn profile(store: &dyn DocumentStore, uid: &str) -> Result<Option<Employee>> {
    match store.get(collection::USERS, uid).await? {
        Some(document) => {
            let mut employee: Employee = from_document(document)?;
            employee.id = uid.to_owned();
            Ok(Some(employee))
        }
        None => Ok(None),
    }
}

/// All employees, optionally filtered by a case-insensitive match on the full
/// name.
pub async fn list(store: &dyn DocumentStore, search: Option<&str>) -> Result<Vec<Employee>> {
    let needle = search.map(str::to_lowercase);

    let mut employees = Vec::new();
    for (id, document) in store.query(collection::USERS, None).await? {
        let mut employee: Employee = from_document(document)?;
        employee.id = id;

        let matches = match &needle {
            Some(needle) => employee.full_name().to_lowercase().contains(needle.as_str()),
            None => true,
        };
        if matches {
            employees.push(employee);
        }
    }
    Ok(employees)
}

pub async fn delete(store: &dyn DocumentStore, actor: &Principal, id: &str) -> Result<()> {
    if id == actor.uid {
        return Err(HrkitError::InvalidInput(
            "you cannot delete your own profile".to_owned(),
        ));
    }

    let email = profile(store, id)
        .await?
        .map(|employee| employee.email)
        .unwrap_or_default();

    store.delete(collection::USERS, id).await?;

    let entry = AuditRecord::new(format!(
        "User {} (ID: {}) deleted user {} (ID: {})",
        actor.email, actor.uid, email, id
    ))
    .by(actor)
    .action_user(id, email.as_str());
    audit::record(store, &entry).await?;

    info!(%id, "Employee deleted");
    Ok(())
}

pub async fn update_profile(
    store: &dyn DocumentStore,
    actor: &Principal,
    id: &str,
    changes: &ProfileUpdate,
) -> Result<()> {
    let employee = profile(store, id)
        .await?
        .ok_or_else(|| HrkitError::DocumentNotFound {
            collection: collection::USERS.to_owned(),
            id: id.to_owned(),
        })?;

    store
        .update(collection::USERS, id, to_document(changes)?)
        .await?;

    let entry = AuditRecord::new(format!("Update user profile: {}", employee.email))
        .user(id, employee.email.as_str())
        .action_user(actor.uid.as_str(), actor.email.as_str());
    audit::record(store, &entry).await?;

    info!(%id, "Profile updated");
    Ok(())
}

/// Edit the actor's own profile. The role stays as stored.
pub async fn update_own_profile(
    store: &dyn DocumentStore,
    actor: &Principal,
    changes: &ProfileUpdate,
) -> Result<()> {
    if let Some(role) = changes.role.as_deref() {
        let current = profile(store, &actor.uid).await?.map(|employee| employee.role);
        if current.as_deref() != Some(role) {
            return Err(HrkitError::InvalidInput(
                "role can only be changed from the admin page".to_owned(),
            ));
        }
    }
    update_profile(store, actor, &actor.uid, changes).await
}
