//! Session store: the current signed-in identity and its change stream.
//!
//! DESIGN
//! ======
//! Backed by a `tokio::sync::watch` channel, so subscribers always see the
//! latest identity and rapid changes coalesce. A subscription is a plain
//! receiver handle: dropping it is the unsubscribe.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::watch;

use crate::identity::Identity;

/// The store was dropped while a subscriber was still listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session store closed")]
pub struct StoreClosed;

/// Holds the identity for one client. Clones share the same underlying state.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Register for identity changes. The first [`IdentitySubscription::next`]
    /// resolves immediately with the current state.
    #[must_use]
    pub fn subscribe(&self) -> IdentitySubscription {
        IdentitySubscription { rx: self.tx.subscribe(), primed: false }
    }

    /// Publish a freshly issued identity.
    pub fn sign_in(&self, identity: Identity) {
        tracing::debug!(uid = identity.uid(), "identity signed in");
        self.tx.send_replace(Some(identity));
    }

    /// Invalidate the current identity. Returns the identity that was signed in.
    pub fn sign_out(&self) -> Option<Identity> {
        let previous = self.tx.send_replace(None);
        if let Some(identity) = &previous {
            tracing::debug!(uid = identity.uid(), "identity signed out");
        }
        previous
    }

    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Live registration on a [`SessionStore`]. Dropping it unsubscribes.
pub struct IdentitySubscription {
    rx: watch::Receiver<Option<Identity>>,
    primed: bool,
}

impl IdentitySubscription {
    /// Wait for the next identity value.
    ///
    /// The first call returns the state at subscription time without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreClosed`] once every handle to the store has been dropped.
    pub async fn next(&mut self) -> Result<Option<Identity>, StoreClosed> {
        if self.primed {
            self.rx.changed().await.map_err(|_| StoreClosed)?;
        }
        self.primed = true;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// The store's identity right now, without consuming a change.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.rx.borrow().clone()
    }
}
