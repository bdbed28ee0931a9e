//! Document store seam over Firestore.
//!
//! DESIGN
//! ======
//! Services talk to a [`DocumentStore`], never to the REST client directly.
//! Reads come back as plain JSON so services can deserialize into their own
//! structs; writes take typed Firestore [`Fields`] so timestamps stay timestamps.
//!
//! [`DocumentStore::for_identity`] scopes a store to the viewer's ID token,
//! which is what Firestore security rules evaluate against.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use firebase::value::fields_to_json;
use firebase::{Document, Fields, FirebaseError, FirestoreClient};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};
use session::Identity;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("firestore: {0}")]
    Backend(#[from] FirebaseError),
    #[error("malformed document {collection}/{id}: {message}")]
    Malformed { collection: String, id: String, message: String },
}

impl StoreError {
    /// The id could never name a document, so nothing was sent.
    #[must_use]
    pub const fn is_invalid_id(&self) -> bool {
        matches!(self, Self::Backend(FirebaseError::InvalidDocumentId(_)))
    }
}

/// One document as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, Json>,
}

impl StoredDocument {
    /// Deserialize the fields into `T`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Malformed`] if the fields do not fit `T`.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, StoreError> {
        serde_json::from_value(Json::Object(self.fields.clone())).map_err(|e| StoreError::Malformed {
            collection: collection.to_owned(),
            id: self.id.clone(),
            message: e.to_string(),
        })
    }

    /// Decode every document that fits `T`. The rest are logged and skipped,
    /// so one bad document cannot take a whole listing down.
    #[must_use]
    pub fn decode_each<T>(
        collection: &str,
        docs: Vec<Self>,
        decode: impl Fn(Self) -> Result<T, StoreError>,
    ) -> Vec<T> {
        docs.into_iter()
            .filter_map(|doc| match decode(doc) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(collection, error = %e, "skipping undecodable document");
                    None
                }
            })
            .collect()
    }

    fn from_rest(collection: &str, doc: Document) -> Result<Self, StoreError> {
        let Some(id) = doc.id().map(str::to_owned) else {
            return Err(StoreError::Malformed {
                collection: collection.to_owned(),
                id: String::new(),
                message: "document has no name".into(),
            });
        };
        Ok(Self { id, fields: fields_to_json(&doc.fields) })
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Every document in `collection`.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Create with an auto-assigned id; returns the id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Upsert: write the named fields, leave the rest untouched.
    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// A store that acts on behalf of `identity` (or anonymously).
    fn for_identity(&self, identity: Option<&Identity>) -> Arc<dyn DocumentStore>;
}

// =============================================================================
// FIRESTORE
// =============================================================================

#[derive(Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
}

impl FirestoreStore {
    #[must_use]
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        match self.client.get_document(collection, id).await? {
            Some(doc) => Ok(Some(StoredDocument::from_rest(collection, doc)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.client
            .list_all(collection)
            .await?
            .into_iter()
            .map(|doc| StoredDocument::from_rest(collection, doc))
            .collect()
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let doc = self.client.create_document(collection, fields).await?;
        Ok(StoredDocument::from_rest(collection, doc)?.id)
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.client.merge_document(collection, id, fields).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        Ok(self.client.delete_document(collection, id).await?)
    }

    fn for_identity(&self, identity: Option<&Identity>) -> Arc<dyn DocumentStore> {
        let client = match identity {
            Some(identity) => self.client.with_bearer(identity.id_token()),
            None => self.client.anonymous(),
        };
        Arc::new(Self { client })
    }
}
