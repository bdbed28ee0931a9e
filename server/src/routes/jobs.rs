//! Public job pages and the seeker-only apply flow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use session::Route;

use super::auth::Viewer;
use super::guard::{Granted, browse, gate};
use crate::services::applications::submit_application;
use crate::services::jobs::{Job, filter_jobs, get_job, list_jobs};
use crate::state::AppState;
use crate::views;
use crate::views::jobs::{apply_page, job_detail_page, job_not_found_page, jobs_page};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct ApplyForm {
    #[serde(default)]
    message: String,
}

/// `GET /`
pub async fn home(State(state): State<AppState>, viewer: Viewer) -> Html<String> {
    let (user, _) = browse(&state, &viewer).await;
    Html(views::home_page(user.as_ref()))
}

/// `GET /jobs?search=`: every job, filtered in memory.
pub async fn list(State(state): State<AppState>, viewer: Viewer, Query(query): Query<SearchQuery>) -> Response {
    let (user, store) = browse(&state, &viewer).await;
    let term = query.search.unwrap_or_default();
    match list_jobs(store.as_ref()).await {
        Ok(jobs) => Html(jobs_page(user.as_ref(), &filter_jobs(&jobs, &term), &term, None)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "job listing failed");
            let html = jobs_page(user.as_ref(), &[], &term, Some("Failed to load jobs. Please try again."));
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `GET /jobs/{id}`: by document id or slug.
pub async fn detail(State(state): State<AppState>, viewer: Viewer, Path(id): Path<String>) -> Response {
    let (user, store) = browse(&state, &viewer).await;
    match get_job(store.as_ref(), &id).await {
        Ok(Some(job)) => Html(job_detail_page(user.as_ref(), &job)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Html(job_not_found_page(user.as_ref()))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, job_id = %id, "job lookup failed");
            let html = views::page("Job", user.as_ref(), &views::error_line(Some("Failed to load this job.")));
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `GET /apply/{id}`
pub async fn apply_form(State(state): State<AppState>, viewer: Viewer, Path(id): Path<String>) -> Response {
    let granted = match gate(&state, &viewer, &Route::Apply(id.clone())).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    match load_job(&granted, &id).await {
        Ok(job) => Html(apply_page(&granted.user, &job, false, "", None)).into_response(),
        Err(response) => response,
    }
}

/// `POST /apply/{id}`
pub async fn apply_submit(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
    Form(form): Form<ApplyForm>,
) -> Response {
    let granted = match gate(&state, &viewer, &Route::Apply(id.clone())).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    let job = match load_job(&granted, &id).await {
        Ok(job) => job,
        Err(response) => return response,
    };
    let message = form.message.trim();
    if message.is_empty() {
        let html = apply_page(&granted.user, &job, false, "", Some("Please write a short message."));
        return (StatusCode::BAD_REQUEST, Html(html)).into_response();
    }
    match submit_application(granted.store.as_ref(), &job, &granted.user, message).await {
        Ok(_) => Html(apply_page(&granted.user, &job, true, "", None)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, job_id = %id, "application write failed");
            let html = apply_page(&granted.user, &job, false, message, Some("Failed to submit application"));
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

async fn load_job(granted: &Granted, id: &str) -> Result<Job, Response> {
    match get_job(granted.store.as_ref(), id).await {
        Ok(Some(job)) => Ok(job),
        Ok(None) => Err((StatusCode::NOT_FOUND, Html(job_not_found_page(Some(&granted.user)))).into_response()),
        Err(e) => {
            tracing::error!(error = %e, job_id = %id, "job lookup failed");
            let html = views::page("Apply", Some(&granted.user), &views::error_line(Some("Failed to load this job.")));
            Err((StatusCode::BAD_GATEWAY, Html(html)).into_response())
        }
    }
}
