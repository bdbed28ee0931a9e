//! Auth context: identity + profile composed into one observable session.
//!
//! STATE MACHINE
//! =============
//! ```text
//!            identity = X                     profile found
//! Loading ---------------------> Loading ------------------> Authenticated
//!    |                             |  not found / failure          |
//!    | identity = none             +-------------------------+     |
//!    v                                                       v     |
//! Unauthenticated <------------------------------------------+-----+
//!                    identity = none, logout()
//! ```
//!
//! CONCURRENCY
//! ===========
//! A driver task consumes the identity subscription. Each identity change bumps
//! a generation counter and starts the profile lookup as its own task, so the
//! driver keeps observing identity changes while a lookup is pending. A lookup
//! only publishes if its generation is still current; the check and the
//! publish happen under one lock. A newer identity also aborts the older
//! lookup outright.
//!
//! `logout()` bumps the generation as well, so a lookup started before logout
//! can never publish afterwards. The driver re-checks the store's identity
//! under the generation lock before starting a lookup, so an identity that was
//! signed out while the driver was waking up never gets a generation of its own.
//!
//! `refresh()` starts a fresh lookup for the current identity. Guards call it
//! on every protected request, so role changes and deleted profiles take
//! effect without signing in again.
//!
//! Dropping the context closes the publisher (no further writes, checked
//! synchronously) and aborts the driver and any pending lookup, which releases
//! the store subscription.

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::identity::Identity;
use crate::profile::{Profile, Role};
use crate::resolver::ProfileResolver;
use crate::store::{IdentitySubscription, SessionStore};

// =============================================================================
// PUBLIC STATE
// =============================================================================

/// The user record exposed to pages once a profile has resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    pub role: Role,
}

impl From<Profile> for SessionUser {
    fn from(profile: Profile) -> Self {
        Self { uid: profile.uid, email: profile.email, role: profile.role }
    }
}

/// Snapshot of the session as seen by route guards and views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl AuthState {
    /// Initial state, and the state while a profile lookup is in flight.
    #[must_use]
    pub const fn loading() -> Self {
        Self { user: None, loading: true }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user: None, loading: false }
    }

    #[must_use]
    pub const fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user), loading: false }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}

/// Read-only view over an [`AuthContext`]'s state.
#[derive(Clone)]
pub struct AuthWatch {
    rx: watch::Receiver<Published>,
}

impl AuthWatch {
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.rx.borrow().state.clone()
    }

    /// Wait for the next published state. Returns `None` once the context is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().state.clone())
    }
}

// =============================================================================
// PUBLISHER
// =============================================================================

/// A published state plus the uid of the identity it was computed for.
#[derive(Debug, Clone)]
struct Published {
    state: AuthState,
    subject: Option<String>,
}

impl Published {
    const fn unsubjected(state: AuthState) -> Self {
        Self { state, subject: None }
    }

    fn about(identity: &Identity, state: AuthState) -> Self {
        Self { state, subject: Some(identity.uid().to_owned()) }
    }
}

struct Generation {
    current: u64,
    closed: bool,
}

/// Outcome of a conditional [`Publisher::advance_if`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    Started(u64),
    /// The condition no longer held; nothing was published.
    Superseded,
    Closed,
}

/// The single writer of an [`AuthState`] channel.
struct Publisher {
    generation: Mutex<Generation>,
    tx: watch::Sender<Published>,
}

impl Publisher {
    fn new() -> (Self, watch::Receiver<Published>) {
        let (tx, rx) = watch::channel(Published::unsubjected(AuthState::loading()));
        (Self { generation: Mutex::new(Generation { current: 0, closed: false }), tx }, rx)
    }

    /// Start a new generation and publish for it.
    /// Returns `None` after the publisher has been closed.
    fn advance(&self, published: Published) -> Option<u64> {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if generation.closed {
            return None;
        }
        generation.current += 1;
        self.tx.send_replace(published);
        Some(generation.current)
    }

    /// Like [`Publisher::advance`], but only if `still_current` holds while the
    /// generation lock is held.
    fn advance_if(&self, published: Published, still_current: impl FnOnce() -> bool) -> Advance {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if generation.closed {
            return Advance::Closed;
        }
        if !still_current() {
            return Advance::Superseded;
        }
        generation.current += 1;
        self.tx.send_replace(published);
        Advance::Started(generation.current)
    }

    /// Publish only if `generation` is still the current one.
    fn publish_if_current(&self, generation: u64, published: Published) -> bool {
        let current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if current.closed || current.current != generation {
            return false;
        }
        self.tx.send_replace(published);
        true
    }

    fn close(&self) {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner).closed = true;
    }
}

// =============================================================================
// AUTH CONTEXT
// =============================================================================

/// The pending lookup and the generation it publishes for.
type InFlight = Arc<Mutex<Option<(u64, AbortHandle)>>>;

/// Owns the session state for one client.
///
/// Must be created from within a Tokio runtime.
pub struct AuthContext {
    store: SessionStore,
    resolver: Arc<dyn ProfileResolver>,
    publisher: Arc<Publisher>,
    state: watch::Receiver<Published>,
    driver: JoinHandle<()>,
    in_flight: InFlight,
}

impl AuthContext {
    /// Subscribe to `store` and start resolving profiles with `resolver`.
    #[must_use]
    pub fn spawn(store: SessionStore, resolver: Arc<dyn ProfileResolver>) -> Self {
        let (publisher, state) = Publisher::new();
        let publisher = Arc::new(publisher);
        let in_flight: InFlight = Arc::new(Mutex::new(None));
        let identities = store.subscribe();

        let driver = tokio::spawn(drive(
            identities,
            Arc::clone(&resolver),
            Arc::clone(&publisher),
            Arc::clone(&in_flight),
        ));

        Self { store, resolver, publisher, state, driver, in_flight }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().state.clone()
    }

    /// Observe state changes published after this call.
    #[must_use]
    pub fn watch(&self) -> AuthWatch {
        let mut rx = self.state.clone();
        rx.mark_unchanged();
        AuthWatch { rx }
    }

    /// Wait up to `timeout` for a non-loading state computed for the store's
    /// current identity. A state left over from a previous identity does not count.
    ///
    /// Returns whatever is current when the wait ends, which may still be
    /// loading if the profile store is slow.
    pub async fn settled(&self, timeout: Duration) -> AuthState {
        let mut rx = self.state.clone();
        let caught_up = |p: &Published| {
            !p.state.loading && p.subject.as_deref() == self.store.current().as_ref().map(Identity::uid)
        };
        match tokio::time::timeout(timeout, rx.wait_for(caught_up)).await {
            Ok(Ok(published)) => published.state.clone(),
            Ok(Err(_)) | Err(_) => self.state(),
        }
    }

    /// Sign out and drop to `Unauthenticated` immediately, without waiting for
    /// the store's change notification to come back around.
    pub fn logout(&self) {
        self.store.sign_out();
        abort_in_flight(&self.in_flight);
        self.publisher.advance(Published::unsubjected(AuthState::signed_out()));
    }

    /// Look the current identity's profile up again. Does nothing while signed out.
    ///
    /// The state reads as loading until the new lookup settles.
    pub fn refresh(&self) {
        let Some(identity) = self.store.current() else {
            return;
        };
        let still_signed_in = || self.store.current().as_ref().map(Identity::uid) == Some(identity.uid());
        if let Advance::Started(generation) =
            self.publisher.advance_if(Published::about(&identity, AuthState::loading()), still_signed_in)
        {
            tracing::debug!(uid = identity.uid(), generation, "refreshing profile");
            start_lookup(&self.resolver, &self.publisher, &self.in_flight, identity, generation);
        }
    }

    /// The store this context listens to.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.publisher.close();
        abort_in_flight(&self.in_flight);
        self.driver.abort();
    }
}

fn abort_in_flight(in_flight: &InFlight) {
    if let Some((_, handle)) = in_flight.lock().unwrap_or_else(PoisonError::into_inner).take() {
        handle.abort();
    }
}

/// Spawn the lookup for `generation` and track it. Whichever of the tracked
/// and the new lookup belongs to the older generation is aborted.
fn start_lookup(
    resolver: &Arc<dyn ProfileResolver>,
    publisher: &Arc<Publisher>,
    in_flight: &InFlight,
    identity: Identity,
    generation: u64,
) {
    let task = tokio::spawn(resolve_and_publish(Arc::clone(resolver), Arc::clone(publisher), identity, generation));
    let handle = task.abort_handle();
    let mut slot = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some((tracked, _)) if *tracked > generation => handle.abort(),
        _ => {
            if let Some((_, older)) = slot.replace((generation, handle)) {
                older.abort();
            }
        }
    }
}

async fn drive(
    mut identities: IdentitySubscription,
    resolver: Arc<dyn ProfileResolver>,
    publisher: Arc<Publisher>,
    in_flight: InFlight,
) {
    loop {
        let identity = match identities.next().await {
            Ok(identity) => identity,
            Err(closed) => {
                tracing::debug!(error = %closed, "identity stream ended");
                publisher.advance(Published::unsubjected(AuthState::signed_out()));
                return;
            }
        };
        abort_in_flight(&in_flight);

        let Some(identity) = identity else {
            if publisher.advance(Published::unsubjected(AuthState::signed_out())).is_none() {
                return;
            }
            continue;
        };

        let still_signed_in = || identities.current().as_ref().map(Identity::uid) == Some(identity.uid());
        match publisher.advance_if(Published::about(&identity, AuthState::loading()), still_signed_in) {
            Advance::Started(generation) => start_lookup(&resolver, &publisher, &in_flight, identity, generation),
            Advance::Superseded => {
                tracing::debug!(uid = identity.uid(), "identity changed before lookup started");
            }
            Advance::Closed => return,
        }
    }
}

async fn resolve_and_publish(
    resolver: Arc<dyn ProfileResolver>,
    publisher: Arc<Publisher>,
    identity: Identity,
    generation: u64,
) {
    let state = match resolver.resolve(&identity).await {
        Ok(Some(record)) => match Profile::from_record(&identity, &record) {
            Ok(profile) => AuthState::authenticated(profile.into()),
            Err(e) => {
                tracing::warn!(uid = identity.uid(), error = %e, "profile unusable; treating viewer as signed out");
                AuthState::signed_out()
            }
        },
        Ok(None) => {
            tracing::info!(uid = identity.uid(), "no profile for identity");
            AuthState::signed_out()
        }
        Err(e) => {
            tracing::warn!(uid = identity.uid(), error = %e, "profile lookup failed");
            AuthState::signed_out()
        }
    };

    if !publisher.publish_if_current(generation, Published::about(&identity, state)) {
        tracing::debug!(uid = identity.uid(), generation, "discarding stale profile lookup");
    }
}
