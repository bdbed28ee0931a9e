//! Identity Toolkit v1 client: email/password sign-up and sign-in, and
//! federated sign-in with a Google ID token.
//!
//! ERROR HANDLING
//! ==============
//! A 400 with a parseable `error.message` becomes [`FirebaseError::Auth`]
//! carrying the provider's code, so forms can show an inline message. Anything
//! else maps through [`FirebaseError::from_http_status`].

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info_span};

use crate::config::FirebaseConfig;
use crate::error::{AuthErrorCode, ErrorEnvelope, FirebaseError, FirebaseResult, error_message};

/// Credential issued by a successful sign-up or sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime of `id_token` in seconds.
    pub expires_in: Option<u64>,
    /// Federated sign-in only: the provider account was seen for the first time.
    pub is_new_user: bool,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("expires_in", &self.expires_in)
            .field("is_new_user", &self.is_new_user)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    is_new_user: bool,
}

impl AccountResponse {
    fn into_credential(self, fallback_email: &str) -> Credential {
        Credential {
            uid: self.local_id,
            email: self.email.filter(|e| !e.is_empty()).unwrap_or_else(|| fallback_email.to_owned()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in.and_then(|s| s.parse().ok()),
            is_new_user: self.is_new_user,
        }
    }
}

#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: Client,
    config: FirebaseConfig,
}

impl IdentityToolkitClient {
    /// # Errors
    ///
    /// Returns [`FirebaseError::Network`] if the HTTP client cannot be built.
    pub fn new(config: FirebaseConfig) -> FirebaseResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("jobverse-firebase/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Create an email/password account.
    ///
    /// # Errors
    ///
    /// [`FirebaseError::Auth`] with e.g. `EmailExists` or `WeakPassword`.
    pub async fn sign_up(&self, email: &str, password: &str) -> FirebaseResult<Credential> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        let response = self.call("signUp", &body).await?;
        Ok(response.into_credential(email))
    }

    /// Exchange email and password for a credential.
    ///
    /// # Errors
    ///
    /// [`FirebaseError::Auth`] with e.g. `InvalidLoginCredentials`.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> FirebaseResult<Credential> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        let response = self.call("signInWithPassword", &body).await?;
        Ok(response.into_credential(email))
    }

    /// Exchange a Google ID token (from the browser sign-in button) for a
    /// Firebase credential. Creates the account on first use.
    ///
    /// # Errors
    ///
    /// [`FirebaseError::Auth`] with `InvalidIdpResponse` if Google rejects the token.
    pub async fn sign_in_with_google(&self, google_id_token: &str, request_uri: &str) -> FirebaseResult<Credential> {
        let body = IdpRequest {
            post_body: format!("id_token={google_id_token}&providerId=google.com"),
            request_uri,
            return_idp_credential: true,
            return_secure_token: true,
        };
        let response = self.call("signInWithIdp", &body).await?;
        Ok(response.into_credential(""))
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> FirebaseResult<AccountResponse> {
        let url = self.config.accounts_url(method);
        let span = info_span!("identity_request", method = %method);

        async {
            let response =
                self.http.post(&url).query(&[("key", self.config.api_key.as_str())]).json(body).send().await?;
            let status = response.status();
            let text = response.text().await?;

            if status.is_success() {
                return serde_json::from_str(&text)
                    .map_err(|e| FirebaseError::InvalidResponse(format!("accounts:{method}: {e}")));
            }

            if status.as_u16() == 400 {
                if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
                    let code = AuthErrorCode::parse(&envelope.error.message);
                    tracing::debug!(method, code = %code, "identity toolkit rejected request");
                    return Err(FirebaseError::Auth(code));
                }
            }
            Err(FirebaseError::from_http_status(status.as_u16(), format!("accounts:{method}: {}", error_message(&text))))
        }
        .instrument(span)
        .await
    }
}
