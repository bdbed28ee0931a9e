//! Job applications in the `applications` collection.

#[cfg(test)]
#[path = "applications_test.rs"]
mod tests;

use firebase::{Fields, Value};
use serde::Deserialize;
use session::SessionUser;

use super::jobs::Job;
use super::now_timestamp;
use super::store::{DocumentStore, StoreError, StoredDocument};

pub const APPLICATIONS: &str = "applications";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub applicant_id: String,
    #[serde(default)]
    pub applicant_email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Record `applicant`'s application to `job`; returns the new id.
///
/// # Errors
///
/// Returns the store error if the write fails.
pub async fn submit_application(
    store: &dyn DocumentStore,
    job: &Job,
    applicant: &SessionUser,
    message: &str,
) -> Result<String, StoreError> {
    let mut fields = Fields::new();
    fields.insert("jobId".into(), Value::string(&job.id));
    fields.insert("jobTitle".into(), Value::string(job.title.clone().unwrap_or_default()));
    fields.insert("applicantId".into(), Value::string(&applicant.uid));
    fields.insert("applicantEmail".into(), Value::string(&applicant.email));
    fields.insert("message".into(), Value::string(message));
    fields.insert("createdAt".into(), now_timestamp());
    let id = store.create(APPLICATIONS, fields).await?;
    tracing::info!(application_id = %id, job_id = %job.id, "application submitted");
    Ok(id)
}

/// Applications submitted by `applicant_id`. Undecodable documents are skipped.
///
/// # Errors
///
/// Returns the store error if the listing fails.
pub async fn applications_for(store: &dyn DocumentStore, applicant_id: &str) -> Result<Vec<Application>, StoreError> {
    let docs = store.list(APPLICATIONS).await?;
    let all = StoredDocument::decode_each(APPLICATIONS, docs, |doc| {
        let mut application: Application = doc.decode(APPLICATIONS)?;
        application.id = doc.id;
        Ok(application)
    });
    Ok(all.into_iter().filter(|application| application.applicant_id == applicant_id).collect())
}
