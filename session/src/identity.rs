//! Authenticated principal issued by the identity provider.

use std::fmt;

/// A signed-in identity.
///
/// Immutable once issued. The ID token is only carried so downstream document
/// reads can be authorized as this user; it never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    uid: String,
    email: String,
    id_token: String,
}

impl Identity {
    #[must_use]
    pub fn new(uid: impl Into<String>, email: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: email.into(), id_token: id_token.into() }
    }

    /// Provider-assigned unique id. Profiles are keyed by this value.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Bearer credential for per-user document access.
    #[must_use]
    pub fn id_token(&self) -> &str {
        &self.id_token
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .finish()
    }
}
