//! Application configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::time::Duration;

use firebase::{FirebaseConfig, FirebaseError};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_SETTLE_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub cookie_secure: bool,
    /// How long a page waits for a pending profile lookup before rendering the placeholder.
    pub settle_timeout: Duration,
    /// Client sessions untouched for this long are dropped.
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    /// Google OAuth client id for the sign-in button. `None` hides the button.
    pub google_client_id: Option<String>,
    pub firebase: FirebaseConfig,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required: `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID`.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: default false
    /// - `SESSION_SETTLE_TIMEOUT_MS`: default 1500
    /// - `SESSION_IDLE_TTL_SECS`: default 3600
    /// - `SESSION_SWEEP_INTERVAL_SECS`: default 60
    /// - `GOOGLE_CLIENT_ID`
    /// - everything [`FirebaseConfig::from_env`] reads
    ///
    /// # Errors
    ///
    /// Returns the Firebase config error when a required variable is missing.
    pub fn from_env() -> Result<Self, FirebaseError> {
        let firebase = FirebaseConfig::from_env()?;
        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(false),
            settle_timeout: Duration::from_millis(env_parse(
                "SESSION_SETTLE_TIMEOUT_MS",
                DEFAULT_SESSION_SETTLE_TIMEOUT_MS,
            )),
            session_idle_ttl: Duration::from_secs(env_parse("SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS)),
            session_sweep_interval: Duration::from_secs(
                env_parse("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SESSION_SWEEP_INTERVAL_SECS).max(1),
            ),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.trim().is_empty()),
            firebase,
        })
    }

    /// Config for tests and local tooling: no env, production Firebase endpoints.
    #[must_use]
    pub fn for_project(api_key: &str, project_id: &str) -> Self {
        Self {
            port: DEFAULT_PORT,
            cookie_secure: false,
            settle_timeout: Duration::from_millis(DEFAULT_SESSION_SETTLE_TIMEOUT_MS),
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            google_client_id: None,
            firebase: FirebaseConfig::new(api_key, project_id),
        }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
