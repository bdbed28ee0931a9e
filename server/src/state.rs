//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the document store, the identity provider, and the registry of live
//! client sessions. The store here is unscoped; handlers narrow it to the
//! viewer with [`DocumentStore::for_identity`] before reading protected data.

use std::sync::Arc;

use session::{Identity, ProfileResolver};

use crate::config::AppConfig;
use crate::services::identity::IdentityProvider;
use crate::services::profiles::StoreProfileResolver;
use crate::services::store::DocumentStore;
use crate::sessions::ClientSessions;

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: ClientSessions,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>, config: AppConfig) -> Self {
        let resolver: Arc<dyn ProfileResolver> = Arc::new(StoreProfileResolver::new(Arc::clone(&store)));
        let sessions = ClientSessions::new(resolver, config.session_idle_ttl);
        Self { store, identity, sessions, config: Arc::new(config) }
    }

    /// The store as seen by `identity`, or anonymously.
    #[must_use]
    pub fn store_for(&self, identity: Option<&Identity>) -> Arc<dyn DocumentStore> {
        self.store.for_identity(identity)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
