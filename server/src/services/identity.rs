//! Identity provider seam: turns credentials into a session [`Identity`].

use async_trait::async_trait;
use firebase::{AuthErrorCode, Credential, FirebaseError, IdentityToolkitClient};
use session::Identity;

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    /// The provider refused the credentials; safe to show to the user.
    #[error("sign-in rejected: {0}")]
    Rejected(AuthErrorCode),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl SignInError {
    /// Inline form message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected(code) => code.user_message(),
            Self::Unavailable(_) => "Sign-in is temporarily unavailable. Please try again.",
        }
    }
}

impl From<FirebaseError> for SignInError {
    fn from(err: FirebaseError) -> Self {
        match err {
            FirebaseError::Auth(code) => Self::Rejected(code),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, SignInError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, SignInError>;

    /// Federated sign-in with a Google ID token posted by the sign-in button.
    async fn sign_in_with_google(&self, google_id_token: &str, request_uri: &str) -> Result<Identity, SignInError>;
}

fn identity_from(credential: Credential) -> Identity {
    Identity::new(credential.uid, credential.email, credential.id_token)
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, SignInError> {
        Ok(identity_from(IdentityToolkitClient::sign_up(self, email, password).await?))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, SignInError> {
        Ok(identity_from(self.sign_in_with_password(email, password).await?))
    }

    async fn sign_in_with_google(&self, google_id_token: &str, request_uri: &str) -> Result<Identity, SignInError> {
        Ok(identity_from(IdentityToolkitClient::sign_in_with_google(self, google_id_token, request_uri).await?))
    }
}
