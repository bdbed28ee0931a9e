use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use firebase::{AuthErrorCode, Fields, Value};
use session::Role;

use super::*;
use crate::services::identity::SignInError;
use crate::services::memory_store::MemoryStore;
use crate::services::profiles::USERS;

/// Identity provider holding accounts in memory.
///
/// Google sign-in accepts any token of the form `google:<email>`.
#[derive(Default)]
pub struct FakeIdentityProvider {
    accounts: Mutex<HashMap<String, (String, String)>>,
    unavailable: Mutex<bool>,
}

impl FakeIdentityProvider {
    /// Register an account up front; returns its uid.
    pub fn add_account(&self, email: &str, password: &str) -> String {
        let uid = format!("uid-{}", email.split('@').next().unwrap_or(email));
        self.lock().insert(email.to_owned(), (uid.clone(), password.to_owned()));
        uid
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap_or_else(PoisonError::into_inner) = unavailable;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, String)>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), SignInError> {
        if *self.unavailable.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(SignInError::Unavailable("fake provider offline".into()));
        }
        Ok(())
    }
}

fn identity_for(uid: &str, email: &str) -> Identity {
    Identity::new(uid, email, format!("token-{uid}"))
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, SignInError> {
        self.check()?;
        if self.lock().contains_key(email) {
            return Err(SignInError::Rejected(AuthErrorCode::EmailExists));
        }
        if password.len() < 6 {
            return Err(SignInError::Rejected(AuthErrorCode::WeakPassword));
        }
        let uid = self.add_account(email, password);
        Ok(identity_for(&uid, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, SignInError> {
        self.check()?;
        match self.lock().get(email) {
            Some((uid, stored)) if stored == password => Ok(identity_for(uid, email)),
            _ => Err(SignInError::Rejected(AuthErrorCode::InvalidLoginCredentials)),
        }
    }

    async fn sign_in_with_google(&self, google_id_token: &str, _request_uri: &str) -> Result<Identity, SignInError> {
        self.check()?;
        let Some(email) = google_id_token.strip_prefix("google:") else {
            return Err(SignInError::Rejected(AuthErrorCode::InvalidIdpResponse));
        };
        let existing = self.lock().get(email).map(|(uid, _)| uid.clone());
        let uid = existing.unwrap_or_else(|| self.add_account(email, ""));
        Ok(identity_for(&uid, email))
    }
}

/// Everything a router test needs to poke at behind the state.
pub struct TestBackend {
    pub state: AppState,
    pub store: MemoryStore,
    pub identity: Arc<FakeIdentityProvider>,
}

/// Create a test `AppState` over an empty in-memory store and fake provider.
#[must_use]
pub fn test_backend() -> TestBackend {
    test_backend_with(AppConfig::for_project("test-key", "demo-jobverse"))
}

#[must_use]
pub fn test_backend_with(config: AppConfig) -> TestBackend {
    let store = MemoryStore::new();
    let identity = Arc::new(FakeIdentityProvider::default());
    let state = AppState::new(Arc::new(store.clone()), Arc::clone(&identity) as Arc<dyn IdentityProvider>, config);
    TestBackend { state, store, identity }
}

/// Seed a `users/{uid}` profile document with a raw role value.
pub fn seed_profile(store: &MemoryStore, uid: &str, email: &str, role: &str) {
    let mut fields = Fields::new();
    fields.insert("uid".into(), Value::string(uid));
    fields.insert("email".into(), Value::string(email));
    fields.insert("role".into(), Value::string(role));
    store.put(USERS, uid, fields);
}

/// Seed an account plus a profile with a known role; returns the uid.
pub fn seed_user(backend: &TestBackend, email: &str, password: &str, role: Role) -> String {
    let uid = backend.identity.add_account(email, password);
    seed_profile(&backend.store, &uid, email, role.as_str());
    uid
}

/// Seed a job document under a fixed id.
pub fn seed_job(store: &MemoryStore, id: &str, title: &str, company: &str, location: &str) {
    let mut fields = Fields::new();
    fields.insert("title".into(), Value::string(title));
    fields.insert("company".into(), Value::string(company));
    fields.insert("location".into(), Value::string(location));
    fields.insert("type".into(), Value::string("Full-Time"));
    store.put(crate::services::jobs::JOBS, id, fields);
}
