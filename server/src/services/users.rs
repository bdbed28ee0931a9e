//! Admin view over the `users` collection.
//!
//! Unlike [`super::profiles`], records here keep the raw role text: an admin
//! needs to see a quarantined role to fix it.

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;

use serde::Deserialize;

use super::profiles::USERS;
use super::store::{DocumentStore, StoreError, StoredDocument};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Stored as-is; only non-string values are dropped.
    #[serde(default, deserialize_with = "raw_role")]
    pub role: Option<String>,
}

fn raw_role<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Every decodable user record.
///
/// # Errors
///
/// Returns the store error if the listing fails.
pub async fn list_users(store: &dyn DocumentStore) -> Result<Vec<UserRecord>, StoreError> {
    let docs = store.list(USERS).await?;
    Ok(StoredDocument::decode_each(USERS, docs, |doc| {
        let mut user: UserRecord = doc.decode(USERS)?;
        user.id = doc.id;
        Ok(user)
    }))
}

/// Delete the profile document. The identity itself is untouched; the user can
/// still sign in but resolves to no profile.
///
/// # Errors
///
/// Returns the store error if the delete fails.
pub async fn delete_user(store: &dyn DocumentStore, id: &str) -> Result<(), StoreError> {
    store.delete(USERS, id).await?;
    tracing::info!(user_id = %id, "user profile deleted");
    Ok(())
}
