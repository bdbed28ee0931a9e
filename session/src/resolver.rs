//! Profile resolver contract.

use async_trait::async_trait;

use crate::identity::Identity;
use crate::profile::ProfileRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed profile document: {0}")]
    Malformed(String),
}

/// Fetches the one profile record keyed by an identity's uid.
///
/// Implementations must be side-effect free. `Ok(None)` means no profile
/// exists for the identity; the caller treats that exactly like signed-out.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve(&self, identity: &Identity) -> Result<Option<ProfileRecord>, ResolveError>;
}
