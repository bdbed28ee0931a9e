//! Job postings in the `jobs` collection.
//!
//! Documents come from two writers (the post-job form and the seeding CLI), so
//! decoding is lenient: every display field is optional and numbers are shown
//! as text. Search filters an already-fetched list in memory.

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use firebase::{Fields, Value};
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use session::SessionUser;

use super::now_timestamp;
use super::store::{DocumentStore, StoreError, StoredDocument};

pub const JOBS: &str = "jobs";

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Invalid(String),
}

// =============================================================================
// JOB
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub applicants: Vec<Json>,
    /// `createdAt` from the post-job form, `postedAt` from seeded jobs.
    #[serde(default, alias = "postedAt", deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

impl Job {
    fn from_doc(doc: &StoredDocument) -> Result<Self, StoreError> {
        let mut job: Self = doc.decode(JOBS)?;
        job.id.clone_from(&doc.id);
        Ok(job)
    }

    /// Path segment for links: the slug when one is set, else the id.
    #[must_use]
    pub fn link_key(&self) -> &str {
        self.slug.as_deref().filter(|s| !s.is_empty()).unwrap_or(&self.id)
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.company, &self.location, &self.category]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Strings stay strings; numbers and booleans become their text; anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Json::deserialize(deserializer)? {
        Json::String(s) => Some(s),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Arrays stay arrays; `null` or any other shape is an empty list.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Json>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Json::deserialize(deserializer)? {
        Json::Array(items) => items,
        _ => Vec::new(),
    })
}

/// Jobs whose title, company, location, or category contains `term`, ignoring case.
/// A blank term keeps everything.
#[must_use]
pub fn filter_jobs<'a>(jobs: &'a [Job], term: &str) -> Vec<&'a Job> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return jobs.iter().collect();
    }
    jobs.iter().filter(|job| job.matches(&needle)).collect()
}

// =============================================================================
// JOB TYPE
// =============================================================================

/// Types offered by the post-job form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Remote,
}

impl JobType {
    pub const ALL: [Self; 4] = [Self::FullTime, Self::PartTime, Self::Internship, Self::Remote];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "Full-Time",
            Self::PartTime => "Part-Time",
            Self::Internship => "Internship",
            Self::Remote => "Remote",
        }
    }
}

impl FromStr for JobType {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| JobError::Invalid(format!("unknown job type '{s}'")))
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// NEW JOB
// =============================================================================

/// Post-job form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewJob {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub description: String,
}

impl NewJob {
    fn into_fields(self, employer: &SessionUser) -> Result<Fields, JobError> {
        let required = [
            ("Job title", &self.title),
            ("Company name", &self.company),
            ("Location", &self.location),
            ("Job description", &self.description),
        ];
        if let Some((label, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(JobError::Invalid(format!("{label} is required")));
        }
        let job_type = self.job_type.parse::<JobType>()?;

        let mut fields = Fields::new();
        fields.insert("title".into(), Value::string(self.title.trim()));
        fields.insert("company".into(), Value::string(self.company.trim()));
        fields.insert("location".into(), Value::string(self.location.trim()));
        fields.insert("type".into(), Value::string(job_type.as_str()));
        fields.insert("description".into(), Value::string(self.description));
        fields.insert("employerId".into(), Value::string(&employer.uid));
        fields.insert("createdAt".into(), now_timestamp());
        fields.insert("applicants".into(), Value::empty_array());
        Ok(fields)
    }
}

// =============================================================================
// STORE ACCESS
// =============================================================================

/// Every decodable job, in store order.
///
/// # Errors
///
/// Returns the store error if the listing fails.
pub async fn list_jobs(store: &dyn DocumentStore) -> Result<Vec<Job>, StoreError> {
    let docs = store.list(JOBS).await?;
    Ok(StoredDocument::decode_each(JOBS, docs, |doc| Job::from_doc(&doc)))
}

/// Look a job up by document id, falling back to a slug match.
///
/// # Errors
///
/// Returns the store error if a read fails.
pub async fn get_job(store: &dyn DocumentStore, key: &str) -> Result<Option<Job>, StoreError> {
    if let Some(doc) = store.get(JOBS, key).await? {
        return Job::from_doc(&doc).map(Some);
    }
    Ok(list_jobs(store).await?.into_iter().find(|job| job.slug.as_deref() == Some(key)))
}

/// Create a posting owned by `employer`; returns the new id.
///
/// # Errors
///
/// [`JobError::Invalid`] for a blank required field or an unknown type,
/// [`JobError::Store`] if the write fails.
pub async fn create_job(store: &dyn DocumentStore, employer: &SessionUser, job: NewJob) -> Result<String, JobError> {
    let fields = job.into_fields(employer)?;
    Ok(store.create(JOBS, fields).await?)
}

/// # Errors
///
/// Returns the store error if the delete fails.
pub async fn delete_job(store: &dyn DocumentStore, id: &str) -> Result<(), StoreError> {
    store.delete(JOBS, id).await
}
