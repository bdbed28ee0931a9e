//! Domain services used by the page handlers.
//!
//! ARCHITECTURE
//! ============
//! Service modules own document shapes and store access so route handlers can
//! stay focused on guard evaluation, form parsing, and rendering. Everything
//! goes through [`store::DocumentStore`]; no service talks to Firestore directly.

pub mod applications;
pub mod identity;
pub mod jobs;
#[cfg(test)]
pub mod memory_store;
pub mod profiles;
pub mod store;
pub mod users;

use firebase::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current time as a Firestore timestamp value.
pub(crate) fn now_timestamp() -> Value {
    match OffsetDateTime::now_utc().format(&Rfc3339) {
        Ok(now) => Value::timestamp(now),
        Err(e) => {
            tracing::warn!(error = %e, "clock outside rfc3339 range; writing null timestamp");
            Value::Null(())
        }
    }
}
