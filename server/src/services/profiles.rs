//! Profile documents in the `users` collection.
//!
//! DESIGN
//! ======
//! The document id is always the identity's uid. Reads go through the
//! viewer-scoped store so Firestore rules see the viewer's own token.
//!
//! Writes merge: registering never erases fields an admin or an earlier
//! sign-in already wrote. [`ensure_profile`] goes further and leaves an
//! existing role alone, which is what federated sign-in needs when the same
//! Google account comes back through the login or register button.

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use firebase::{Fields, Value};
use session::{Identity, ProfileRecord, ProfileResolver, ResolveError, Role};

use super::now_timestamp;
use super::store::{DocumentStore, StoreError};

pub const USERS: &str = "users";

/// [`ProfileResolver`] backed by the document store.
pub struct StoreProfileResolver {
    store: Arc<dyn DocumentStore>,
}

impl StoreProfileResolver {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileResolver for StoreProfileResolver {
    async fn resolve(&self, identity: &Identity) -> Result<Option<ProfileRecord>, ResolveError> {
        let scoped = self.store.for_identity(Some(identity));
        let doc = match scoped.get(USERS, identity.uid()).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(None),
            Err(e) => return Err(ResolveError::Unavailable(e.to_string())),
        };
        doc.decode::<ProfileRecord>(USERS)
            .map(Some)
            .map_err(|e| ResolveError::Malformed(e.to_string()))
    }
}

fn profile_fields(identity: &Identity, role: Role) -> Fields {
    let mut fields = Fields::new();
    fields.insert("uid".into(), Value::string(identity.uid()));
    fields.insert("email".into(), Value::string(identity.email()));
    fields.insert("role".into(), Value::string(role.as_str()));
    fields.insert("createdAt".into(), now_timestamp());
    fields
}

/// Write the profile for a freshly registered identity.
///
/// # Errors
///
/// Returns the store error if the write fails.
pub async fn create_profile(store: &dyn DocumentStore, identity: &Identity, role: Role) -> Result<(), StoreError> {
    store.for_identity(Some(identity)).merge(USERS, identity.uid(), profile_fields(identity, role)).await
}

/// Make sure `identity` has a profile, creating one with `default_role` if not.
///
/// Returns `true` when a profile was written.
///
/// # Errors
///
/// Returns the store error if the read or the write fails.
pub async fn ensure_profile(
    store: &dyn DocumentStore,
    identity: &Identity,
    default_role: Role,
) -> Result<bool, StoreError> {
    let scoped = store.for_identity(Some(identity));
    if let Some(existing) = scoped.get(USERS, identity.uid()).await? {
        let has_role = existing.fields.get("role").and_then(|r| r.as_str()).is_some_and(|r| !r.is_empty());
        if has_role {
            return Ok(false);
        }
    }
    scoped.merge(USERS, identity.uid(), profile_fields(identity, default_role)).await?;
    Ok(true)
}
