//! Client-session registry.
//!
//! DESIGN
//! ======
//! Each browser gets one [`ClientSession`], found by the opaque id in its
//! session cookie. A client session owns exactly one [`SessionStore`] and one
//! [`AuthContext`]; the context is spawned when the session opens and torn
//! down when the last handle to the session drops.
//!
//! Sessions leave the registry on logout or after sitting idle past the
//! configured TTL. The sweeper is a plain interval task; handlers that still
//! hold an `Arc<ClientSession>` finish their request normally.

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use session::{AuthContext, ProfileResolver, SessionStore};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex session id.
#[must_use]
pub fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// CLIENT SESSION
// =============================================================================

pub struct ClientSession {
    id: String,
    auth: AuthContext,
    last_seen: Mutex<Instant>,
}

impl ClientSession {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.auth.store()
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen.lock().unwrap_or_else(PoisonError::into_inner).elapsed()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Clone)]
pub struct ClientSessions {
    inner: Arc<RwLock<HashMap<String, Arc<ClientSession>>>>,
    resolver: Arc<dyn ProfileResolver>,
    idle_ttl: Duration,
}

impl ClientSessions {
    #[must_use]
    pub fn new(resolver: Arc<dyn ProfileResolver>, idle_ttl: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), resolver, idle_ttl }
    }

    /// Open a fresh, signed-out client session.
    pub async fn open(&self) -> Arc<ClientSession> {
        let auth = AuthContext::spawn(SessionStore::new(), Arc::clone(&self.resolver));
        let session = Arc::new(ClientSession { id: generate_session_id(), auth, last_seen: Mutex::new(Instant::now()) });
        self.inner.write().await.insert(session.id.clone(), Arc::clone(&session));
        tracing::debug!(session_id = %&session.id[..8], "client session opened");
        session
    }

    /// Look a session up and mark it active.
    pub async fn get(&self, id: &str) -> Option<Arc<ClientSession>> {
        let session = self.inner.read().await.get(id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Remove a session and log it out.
    pub async fn close(&self, id: &str) -> Option<Arc<ClientSession>> {
        let session = self.inner.write().await.remove(id)?;
        session.auth.logout();
        Some(session)
    }

    /// Drop every session idle past the TTL. Returns how many were removed.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.idle_for() < self.idle_ttl);
        before - sessions.len()
    }

    /// Sweep on a fixed interval until the handle is aborted.
    #[must_use]
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = sessions.sweep_idle().await;
                if removed > 0 {
                    let remaining = sessions.len().await;
                    tracing::info!(removed, remaining, "swept idle client sessions");
                }
            }
        })
    }

    /// Number of open sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
