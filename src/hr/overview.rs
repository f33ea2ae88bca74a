use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::core::store::{collection, DocumentStore};
use crate::hr::employee::REGISTER_DATE_FIELD;
use crate::Result;

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_users: usize,
    pub registered_today: usize,
    pub departments: usize,
    pub roles: usize,
}

/// `registered_today` counts profiles whose register date falls on the UTC
/// day of `now`.
pub async fn summary(store: &dyn DocumentStore, now: DateTime<Utc>) -> Result<Summary> {
    let users = store.query(collection::USERS, None).await?;
    let today = now.date_naive();

    let registered_today = users
        .iter()
        .filter_map(|(_, document)| match document.get(REGISTER_DATE_FIELD) {
            Some(Value::String(date)) => DateTime::parse_from_rfc3339(date).ok(),
            _ => None,
        })
        .filter(|date| date.with_timezone(&Utc).date_naive() == today)
        .count();

    Ok(Summary {
        total_users: users.len(),
        registered_today,
        departments: store.query(collection::DEPARTMENTS, None).await?.len(),
        roles: store.query(collection::ROLES, None).await?.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn user(register_date: Option<String>) -> crate::core::store::Document {
        let mut document = serde_json::Map::new();
        document.insert("email".into(), json!("x@example.com"));
        if let Some(date) = register_date {
            document.insert(REGISTER_DATE_FIELD.into(), Value::String(date));
        }
        document
    }

    #[test]
    fn counts_collections_and_todays_registrations() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();
            let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();

            store
                .set("users", "a", user(Some(now.to_rfc3339())))
                .await
                .unwrap();
            store
                .set("users", "b", user(Some((now - Duration::days(1)).to_rfc3339())))
                .await
                .unwrap();
            store.set("users", "c", user(None)).await.unwrap();
            store
                .set("users", "d", user(Some("not a date".into())))
                .await
                .unwrap();
            store
                .set("departments", "research", serde_json::Map::new())
                .await
                .unwrap();

            let summary = summary(&store, now).await.unwrap();
            assert_eq!(
                summary,
                Summary {
                    total_users: 4,
                    registered_today: 1,
                    departments: 1,
                    roles: 0,
                }
            );
        })
    }
}
