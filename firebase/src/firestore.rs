//! Cloud Firestore REST client.
//!
//! DESIGN
//! ======
//! Requests carry the project's web API key and, when present, the signed-in
//! user's ID token as a bearer. Firestore security rules evaluate against that
//! token, so a client is cheap to clone per viewer with [`FirestoreClient::with_bearer`].
//!
//! Each call runs inside a `firestore_request` span. There is no retry.

#[cfg(test)]
#[path = "firestore_test.rs"]
mod tests;

use std::future::Future;
use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tracing::{Instrument, info_span};

use crate::config::FirebaseConfig;
use crate::error::{FirebaseError, FirebaseResult, error_message};
use crate::value::{Document, Fields, ListDocumentsResponse};

/// Page size requested when walking a whole collection.
pub const LIST_PAGE_SIZE: u32 = 300;

#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    documents_url: Arc<str>,
    api_key: Arc<str>,
    bearer: Option<Arc<str>>,
}

impl FirestoreClient {
    /// # Errors
    ///
    /// Returns [`FirebaseError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &FirebaseConfig) -> FirebaseResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("jobverse-firebase/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            documents_url: config.documents_url().into(),
            api_key: config.api_key.as_str().into(),
            bearer: None,
        })
    }

    /// Same client, authorized as the holder of `id_token`.
    #[must_use]
    pub fn with_bearer(&self, id_token: &str) -> Self {
        Self { bearer: Some(id_token.into()), ..self.clone() }
    }

    /// Same client with no user token.
    #[must_use]
    pub fn anonymous(&self) -> Self {
        Self { bearer: None, ..self.clone() }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.documents_url)
    }

    /// `id` is percent-encoded as one path segment, so it can never address
    /// a document outside `collection`.
    fn document_url(&self, collection: &str, id: &str) -> FirebaseResult<String> {
        if !is_valid_document_id(id) {
            return Err(FirebaseError::InvalidDocumentId(id.to_owned()));
        }
        let mut url = Url::parse(&self.collection_url(collection))
            .map_err(|e| FirebaseError::Config(format!("documents url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| FirebaseError::Config("documents url has no path".into()))?
            .push(id);
        Ok(url.into())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("key", &*self.api_key)]);
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Fetch one document. `Ok(None)` if it does not exist, including when
    /// `id` is not a valid document id at all.
    ///
    /// # Errors
    ///
    /// Any non-404 failure.
    pub async fn get_document(&self, collection: &str, id: &str) -> FirebaseResult<Option<Document>> {
        let url = match self.document_url(collection, id) {
            Ok(url) => url,
            Err(FirebaseError::InvalidDocumentId(_)) => {
                tracing::debug!(collection, id, "invalid document id; treating as missing");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        execute("get_document", collection, Some(id), async {
            let response = self.authorize(self.http.get(&url)).send().await?;
            match response.status() {
                StatusCode::OK => Ok(Some(response.json::<Document>().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(error_from_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Fetch one page of a collection.
    ///
    /// # Errors
    ///
    /// Any non-success status.
    pub async fn list_documents(
        &self,
        collection: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> FirebaseResult<ListDocumentsResponse> {
        let url = self.collection_url(collection);
        execute("list_documents", collection, None, async {
            let mut request = self.authorize(self.http.get(&url)).query(&[("pageSize", page_size)]);
            if let Some(token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = request.send().await?;
            match response.status() {
                StatusCode::OK => Ok(response.json::<ListDocumentsResponse>().await?),
                status => Err(error_from_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Fetch every document in a collection, following `nextPageToken`.
    ///
    /// # Errors
    ///
    /// The first page failure; already-fetched pages are discarded.
    pub async fn list_all(&self, collection: &str) -> FirebaseResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_documents(collection, LIST_PAGE_SIZE, page_token.as_deref()).await?;
            documents.extend(page.documents);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        tracing::debug!(collection, count = documents.len(), "listed collection");
        Ok(documents)
    }

    /// Create a document with a server-assigned id.
    ///
    /// # Errors
    ///
    /// Any non-success status, or a response without a resource name.
    pub async fn create_document(&self, collection: &str, fields: Fields) -> FirebaseResult<Document> {
        let url = self.collection_url(collection);
        let body = Document::new(fields);
        execute("create_document", collection, None, async {
            let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    let doc = response.json::<Document>().await?;
                    if doc.id().is_none() {
                        return Err(FirebaseError::InvalidResponse(format!("{url}: created document has no name")));
                    }
                    Ok(doc)
                }
                status => Err(error_from_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Upsert `fields` into a document, leaving fields not named untouched.
    ///
    /// Sends one `updateMask.fieldPaths` per top-level field, which makes the
    /// PATCH a merge rather than a replace.
    ///
    /// # Errors
    ///
    /// [`FirebaseError::InvalidDocumentId`] before sending, or any non-success status.
    pub async fn merge_document(&self, collection: &str, id: &str, fields: Fields) -> FirebaseResult<Document> {
        let url = self.document_url(collection, id)?;
        let mask: Vec<(&str, String)> =
            fields.keys().map(|path| ("updateMask.fieldPaths", field_path(path))).collect();
        let body = Document::new(fields);
        execute("merge_document", collection, Some(id), async {
            let response = self.authorize(self.http.patch(&url)).query(&mask).json(&body).send().await?;
            match response.status() {
                StatusCode::OK => Ok(response.json::<Document>().await?),
                status => Err(error_from_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Delete a document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// [`FirebaseError::InvalidDocumentId`] before sending, or any non-success
    /// status other than 404.
    pub async fn delete_document(&self, collection: &str, id: &str) -> FirebaseResult<()> {
        let url = self.document_url(collection, id)?;
        execute("delete_document", collection, Some(id), async {
            let response = self.authorize(self.http.delete(&url)).send().await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                StatusCode::NOT_FOUND => {
                    tracing::debug!(collection, id, "document already gone");
                    Ok(())
                }
                status => Err(error_from_response(status, &url, response).await),
            }
        })
        .await
    }
}

/// Firestore document id rules: one non-empty path segment of at most 1500
/// bytes, not `.` or `..`, not of the reserved form `__*__`.
#[must_use]
pub fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 1500
        && !id.contains('/')
        && id != "."
        && id != ".."
        && !(id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
}

/// Quote a field name with backticks unless it is a simple identifier.
fn field_path(name: &str) -> String {
    let simple = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple { name.to_owned() } else { format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`")) }
}

async fn execute<T, F>(operation: &str, collection: &str, id: Option<&str>, fut: F) -> FirebaseResult<T>
where
    F: Future<Output = FirebaseResult<T>>,
{
    let span = match id {
        Some(id) => info_span!("firestore_request", operation = %operation, collection = %collection, doc_id = %id),
        None => info_span!("firestore_request", operation = %operation, collection = %collection),
    };
    let result = fut.instrument(span).await;
    if let Err(e) = &result {
        tracing::warn!(operation, collection, error = %e, "firestore request failed");
    }
    result
}

async fn error_from_response(status: StatusCode, url: &str, response: Response) -> FirebaseError {
    let body = response.text().await.unwrap_or_default();
    FirebaseError::from_http_status(status.as_u16(), format!("{url}: {}", error_message(&body)))
}
