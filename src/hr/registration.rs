use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::info;
use crate::core::identity::IdentityProvider;
use crate::core::store::{collection, to_document, DocumentStore, Filter};
use crate::core::Role;
use crate::hr::audit::{self, AuditRecord};
use crate::hr::employee::REGISTER_DATE_FIELD;
use crate::Result;

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("admin", &self.admin)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registered {
    Created { uid: String, role: Role },
    /// A profile with the email already existed; only the name was updated.
    Updated { uid: String },
}

/// Register a user, or refresh the name on an existing profile with the same
/// email. New users are signed up with the identity provider, which signs
/// them in.
pub async fn register(
    provider: &dyn IdentityProvider,
    store: &dyn DocumentStore,
    registration: &Registration,
) -> Result<Registered> {
    let Registration {
        email,
        password,
        first_name,
        last_name,
        admin,
    } = registration;

    let existing = store
        .query(
            collection::USERS,
            Some(&Filter::eq("email", email.as_str())),
        )
        .await?;

    if let Some((uid, _)) = existing.into_iter().next() {
        store
            .update(
                collection::USERS,
                &uid,
                to_document(&json!({ "firstName": first_name, "lastName": last_name }))?,
            )
            .await?;

        let entry = AuditRecord::new(format!(
            "User updated: {} {} (Email: {}, ID: {})",
            first_name, last_name, email, uid
        ))
        .user(uid.as_str(), email.as_str())
        .action_user(uid.as_str(), email.as_str());
        audit::record(store, &entry).await?;

        info!(%uid, "Existing user updated on registration");
        return Ok(Registered::Updated { uid });
    }

    let role = Role::new(if *admin { Role::ADMIN } else { Role::EMPLOYEE });
    let principal = provider.sign_up(email, password).await?;
    let uid = principal.uid;

    let mut profile = to_document(&json!({
        "uid": uid,
        "email": email,
        "firstName": first_name,
        "lastName": last_name,
        "role": role,
    }))?;
    profile.insert(
        REGISTER_DATE_FIELD.to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );
    store.set(collection::USERS, &uid, profile).await?;

    let entry = AuditRecord::new(format!(
        "New user registered: {} {} (Email: {}, ID: {})",
        first_name, last_name, email, uid
    ))
    .user(uid.as_str(), email.as_str())
    .action_user(uid.as_str(), email.as_str());
    audit::record(store, &entry).await?;

    info!(%uid, %role, "User registered");
    Ok(Registered::Created { uid, role })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::MemoryIdentityProvider;
    use crate::core::store::MemoryStore;
    use crate::hr::employee;
    use crate::HrkitError;

    fn registration(email: &str, admin: bool) -> Registration {
        Registration {
            email: email.into(),
            password: "secret1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            admin,
        }
    }

    #[test]
    fn new_user_gets_profile_and_signs_in() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            let store = MemoryStore::new();

            let registered = register(&provider, &store, &registration("ada@example.com", true))
                .await
                .unwrap();
            let uid = match registered {
                Registered::Created { uid, role } => {
                    assert_eq!(role.as_str(), "Admin");
                    uid
                }
                other => panic!("unexpected {:?}", other),
            };

            assert_eq!(provider.current().map(|p| p.uid), Some(uid.clone()));
            let profile = employee::profile(&store, &uid).await.unwrap().unwrap();
            assert_eq!(profile.role, "Admin");
            assert!(profile.register_date.is_some());

            let records = audit::list(&store).await.unwrap();
            assert!(records[0].action.starts_with("New user registered: Ada Lovelace"));
        })
    }

    #[test]
    fn existing_email_only_updates_name() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            let store = MemoryStore::new();
            let created = register(&provider, &store, &registration("ada@example.com", false))
                .await
                .unwrap();
            let uid = match created {
                Registered::Created { uid, .. } => uid,
                other => panic!("unexpected {:?}", other),
            };

            let mut again = registration("ada@example.com", true);
            again.first_name = "Augusta".into();
            let registered = register(&provider, &store, &again).await.unwrap();
            assert_eq!(registered, Registered::Updated { uid: uid.clone() });

            let profile = employee::profile(&store, &uid).await.unwrap().unwrap();
            assert_eq!(profile.first_name, "Augusta");
            assert_eq!(profile.role, "Employee");
        })
    }

    #[test]
    fn provider_errors_propagate() {
        tokio_test::block_on(async move {
            let provider = MemoryIdentityProvider::new();
            let store = MemoryStore::new();
            let mut weak = registration("ada@example.com", false);
            weak.password = "123".into();

            let err = register(&provider, &store, &weak).await.unwrap_err();
            assert!(matches!(err, HrkitError::InvalidInput(_)));
            assert_eq!(store.len(collection::USERS), 0);
        })
    }
}
