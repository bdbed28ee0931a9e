//! Error types shared by both REST clients.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use serde::Deserialize;

pub type FirebaseResult<T> = Result<T, FirebaseError>;

#[derive(Debug, thiserror::Error)]
pub enum FirebaseError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Identity Toolkit rejected the request with a known error code.
    #[error("auth rejected: {0}")]
    Auth(AuthErrorCode),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("server error {0}: {1}")]
    Server(u16, String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rejected before any request: not usable as a single path segment.
    #[error("invalid document id: {0:?}")]
    InvalidDocumentId(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FirebaseError {
    /// Map a non-success HTTP status to an error variant.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthenticated(message),
            403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            409 => Self::AlreadyExists(message),
            429 => Self::RateLimited(message),
            500..=599 => Self::Server(status, message),
            _ => Self::RequestFailed(message),
        }
    }

    /// The HTTP status this error corresponds to, when there is one.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated(_) => Some(401),
            Self::PermissionDenied(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::AlreadyExists(_) => Some(409),
            Self::RateLimited(_) => Some(429),
            Self::Server(status, _) => Some(*status),
            Self::Auth(_) | Self::RequestFailed(_) | Self::InvalidDocumentId(_) => Some(400),
            Self::Config(_) | Self::InvalidResponse(_) | Self::Network(_) | Self::Json(_) => None,
        }
    }
}

// =============================================================================
// GOOGLE API ERROR ENVELOPE
// =============================================================================

/// `{"error": {"code": 400, "message": "EMAIL_EXISTS", "status": "INVALID_ARGUMENT"}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pull the human-readable message out of an error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) if !envelope.error.message.is_empty() => format!("{status}: {}", envelope.error.message),
            Some(status) => status,
            None => envelope.error.message,
        },
        Err(_) => body.to_owned(),
    }
}

// =============================================================================
// IDENTITY TOOLKIT ERROR CODES
// =============================================================================

/// Error codes returned by the Identity Toolkit account endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailExists,
    EmailNotFound,
    InvalidPassword,
    InvalidLoginCredentials,
    WeakPassword,
    InvalidEmail,
    MissingPassword,
    UserDisabled,
    TooManyAttempts,
    InvalidIdpResponse,
    OperationNotAllowed,
    Other(String),
}

impl AuthErrorCode {
    /// Parse the `message` field. Some codes carry a detail suffix after `" : "`.
    #[must_use]
    pub fn parse(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_EXISTS" => Self::EmailExists,
            "EMAIL_NOT_FOUND" => Self::EmailNotFound,
            "INVALID_PASSWORD" => Self::InvalidPassword,
            "INVALID_LOGIN_CREDENTIALS" => Self::InvalidLoginCredentials,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "MISSING_PASSWORD" => Self::MissingPassword,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "INVALID_IDP_RESPONSE" => Self::InvalidIdpResponse,
            "OPERATION_NOT_ALLOWED" => Self::OperationNotAllowed,
            _ => Self::Other(message.to_owned()),
        }
    }

    /// Message suitable for showing inline on a form.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::EmailExists => "An account with this email already exists.",
            Self::EmailNotFound | Self::InvalidPassword | Self::InvalidLoginCredentials => {
                "Invalid email or password."
            }
            Self::WeakPassword => "Password should be at least 6 characters.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::MissingPassword => "Please enter a password.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyAttempts => "Too many attempts. Please try again later.",
            Self::InvalidIdpResponse => "Google sign-in failed. Please try again.",
            Self::OperationNotAllowed => "This sign-in method is not enabled.",
            Self::Other(message) => message,
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(message) => f.write_str(message),
            known => write!(f, "{known:?}"),
        }
    }
}
