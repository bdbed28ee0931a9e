//! In-memory [`DocumentStore`] for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use firebase::{Fields, FirebaseError};
use firebase::firestore::is_valid_document_id;
use firebase::value::fields_to_json;
use session::Identity;

use super::store::{DocumentStore, StoreError, StoredDocument};

type Collections = HashMap<String, BTreeMap<String, Fields>>;

/// Process-local store. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
    next_id: Arc<Mutex<u64>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document under a known id.
    pub fn put(&self, collection: &str, id: &str, fields: Fields) {
        self.lock().entry(collection.to_owned()).or_default().insert(id.to_owned(), fields);
    }

    /// Make every subsequent call fail as if the backend were down.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, BTreeMap::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Same id rules as the REST client.
    fn check_id(id: &str) -> Result<(), StoreError> {
        if is_valid_document_id(id) {
            Ok(())
        } else {
            Err(StoreError::Backend(FirebaseError::InvalidDocumentId(id.to_owned())))
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(StoreError::Backend(FirebaseError::Server(503, "memory store set to fail".into())));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.check()?;
        if !is_valid_document_id(id) {
            return Ok(None);
        }
        Ok(self
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| StoredDocument { id: id.to_owned(), fields: fields_to_json(fields) }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.check()?;
        Ok(self
            .lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument { id: id.clone(), fields: fields_to_json(fields) })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.check()?;
        let id = {
            let mut next = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
            *next += 1;
            format!("{collection}-{next:04}")
        };
        self.put(collection, &id, fields);
        Ok(id)
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check()?;
        Self::check_id(id)?;
        let mut collections = self.lock();
        let doc = collections.entry(collection.to_owned()).or_default().entry(id.to_owned()).or_default();
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check()?;
        Self::check_id(id)?;
        if let Some(docs) = self.lock().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    fn for_identity(&self, _identity: Option<&Identity>) -> Arc<dyn DocumentStore> {
        Arc::new(self.clone())
    }
}
