//! Profile records and the role enumeration.
//!
//! DESIGN
//! ======
//! Profiles are stored as loosely-typed documents. [`ProfileRecord`] mirrors the
//! stored shape exactly; [`Profile`] is the validated form the rest of the
//! system works with. Conversion is the single place a stored role string is
//! interpreted, and unknown roles are rejected there instead of falling through
//! to some default branch.

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Authorization tag carried by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seeker,
    Employer,
    Admin,
    /// Legacy default written by federated sign-in before a role was chosen.
    /// Grants access to authenticated-only pages and nothing role-gated.
    User,
}

impl Role {
    /// Roles a person may pick for themselves at registration.
    pub const SELF_SERVICE: [Self; 2] = [Self::Seeker, Self::Employer];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seeker => "seeker",
            Self::Employer => "employer",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Human label used in page copy.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seeker => "Job Seeker",
            Self::Employer => "Employer",
            Self::Admin => "Admin",
            Self::User => "Member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProfileError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "seeker" => Ok(Self::Seeker),
            "employer" => Ok(Self::Employer),
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(ProfileError::UnknownRole(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile has no role")]
    MissingRole,
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("profile uid '{stored}' does not match identity '{expected}'")]
    UidMismatch { stored: String, expected: String },
}

/// Stored profile document, exactly as read from the `users` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Validated profile for a signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub uid: String,
    pub email: String,
    pub role: Role,
}

impl Profile {
    /// Validate a stored record for `identity`.
    ///
    /// The uid always comes from the identity (the record is looked up by it);
    /// a stored `uid` field that disagrees marks the record unusable. A missing
    /// stored email falls back to the identity's email.
    ///
    /// # Errors
    ///
    /// Returns an error if the role is missing or not one of the known roles,
    /// or if the record names a different uid.
    pub fn from_record(identity: &Identity, record: &ProfileRecord) -> Result<Self, ProfileError> {
        if let Some(stored) = record.uid.as_deref() {
            if stored != identity.uid() {
                return Err(ProfileError::UidMismatch { stored: stored.to_owned(), expected: identity.uid().to_owned() });
            }
        }
        let role = record.role.as_deref().ok_or(ProfileError::MissingRole)?.parse::<Role>()?;
        let email = record
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(identity.email())
            .to_owned();
        Ok(Self { uid: identity.uid().to_owned(), email, role })
    }
}
