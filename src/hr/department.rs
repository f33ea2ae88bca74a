use serde::{Deserialize, Serialize};

use crate::common::info;
use crate::core::store::{collection, from_document, to_document, DocumentStore};
use crate::core::Principal;
use crate::hr::audit::{self, AuditRecord};
use crate::{HrkitError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Department {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub positions: Vec<String>,
    pub heads: Vec<String>,
}

/// Department form input. `positions` is a comma separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewDepartment {
    pub name: String,
    pub positions: String,
    pub heads: Vec<String>,
}

impl NewDepartment {
    fn to_department(&self) -> Department {
        Department {
            id: department_id(&self.name),
            name: self.name.clone(),
            positions: split_list(&self.positions),
            heads: self
                .heads
                .iter()
                .filter(|head| !head.trim().is_empty())
                .cloned()
                .collect(),
        }
    }
}

pub fn department_id(name: &str) -> String {
    name.to_lowercase()
}

pub(crate) fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Store the department under its lower-cased name, replacing any previous one.
pub async fn add(
    store: &dyn DocumentStore,
    actor: &Principal,
    department: &NewDepartment,
) -> Result<String> {
    if department.name.trim().is_empty() {
        return Err(HrkitError::InvalidInput(
            "department name is required".to_owned(),
        ));
    }

    let department = department.to_department();
    store
        .set(
            collection::DEPARTMENTS,
            &department.id,
            to_document(&department)?,
        )
        .await?;

    let entry = AuditRecord::new(format!("New Department added by {}", actor.email))
        .by(actor)
        .action_user(department.id.as_str(), actor.email.as_str());
    audit::record(store, &entry).await?;

    info!(id=%department.id, "Department added");
    Ok(department.id)
}

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Department>> {
    store
        .query(collection::DEPARTMENTS, None)
        .await?
        .into_iter()
        .map(|(id, document)| {
            let mut department: Department = from_document(document)?;
            department.id = id;
            Ok(department)
        })
        .collect()
}

/// Positions offered by the department with the given display name.
pub async fn positions(store: &dyn DocumentStore, name: &str) -> Result<Vec<String>> {
    Ok(list(store)
        .await?
        .into_iter()
        .find(|department| department.name == name)
        .map(|department| department.positions)
        .unwrap_or_default())
}
