//! Firebase project configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::time::Duration;

use crate::error::FirebaseError;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Web API key; sent as `?key=` on every request.
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    /// Scheme and host for Identity Toolkit, without the `/v1` suffix.
    pub identity_endpoint: String,
    /// Scheme and host for Firestore, without the `/v1` suffix.
    pub firestore_endpoint: String,
    pub timeout: Duration,
}

impl FirebaseConfig {
    /// Production endpoints for `project_id`.
    #[must_use]
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_owned(),
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_owned(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Build config from environment variables.
    ///
    /// Required:
    /// - `FIREBASE_API_KEY`
    /// - `FIREBASE_PROJECT_ID`
    ///
    /// Optional:
    /// - `FIRESTORE_DATABASE_ID`: default `(default)`
    /// - `HTTP_TIMEOUT_SECS`: default 30
    /// - `FIREBASE_AUTH_EMULATOR_HOST`: `host:port` of the Auth emulator
    /// - `FIRESTORE_EMULATOR_HOST`: `host:port` of the Firestore emulator
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Config`] if a required variable is missing or empty.
    pub fn from_env() -> Result<Self, FirebaseError> {
        let api_key = required("FIREBASE_API_KEY")?;
        let project_id = required("FIREBASE_PROJECT_ID")?;

        let mut config = Self::new(api_key, project_id);
        if let Ok(database_id) = std::env::var("FIRESTORE_DATABASE_ID") {
            if !database_id.trim().is_empty() {
                config.database_id = database_id.trim().to_owned();
            }
        }
        config.timeout = Duration::from_secs(
            std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let auth_emulator = std::env::var("FIREBASE_AUTH_EMULATOR_HOST").ok();
        let firestore_emulator = std::env::var("FIRESTORE_EMULATOR_HOST").ok();
        Ok(config.with_emulators(auth_emulator.as_deref(), firestore_emulator.as_deref()))
    }

    /// Point either client at a local emulator (`host:port`).
    #[must_use]
    pub fn with_emulators(mut self, auth_host: Option<&str>, firestore_host: Option<&str>) -> Self {
        if let Some(host) = auth_host.map(str::trim).filter(|h| !h.is_empty()) {
            self.identity_endpoint = format!("http://{host}/identitytoolkit.googleapis.com");
        }
        if let Some(host) = firestore_host.map(str::trim).filter(|h| !h.is_empty()) {
            self.firestore_endpoint = format!("http://{host}");
        }
        self
    }

    /// Root URL for document paths: `.../v1/projects/{p}/databases/{d}/documents`.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.firestore_endpoint.trim_end_matches('/'),
            self.project_id,
            self.database_id
        )
    }

    /// URL for an Identity Toolkit `accounts:*` method.
    #[must_use]
    pub fn accounts_url(&self, method: &str) -> String {
        format!("{}/v1/accounts:{method}", self.identity_endpoint.trim_end_matches('/'))
    }
}

fn required(key: &str) -> Result<String, FirebaseError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(FirebaseError::Config(format!("{key} must be set"))),
    }
}
