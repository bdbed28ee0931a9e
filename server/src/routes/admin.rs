//! Admin moderation pages: counts, user list, job list, deletes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use session::{Route, SessionUser};

use super::auth::Viewer;
use super::guard::gate;
use crate::services::applications::APPLICATIONS;
use crate::services::jobs::{delete_job, list_jobs};
use crate::services::profiles::USERS;
use crate::services::store::DocumentStore;
use crate::services::users::{delete_user, list_users};
use crate::state::AppState;
use crate::views::dashboard as pages;

/// `GET /dashboard/admin`
pub async fn dashboard(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::AdminDashboard).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    let store = granted.store.as_ref();
    match futures::try_join!(store.list(USERS), list_jobs(store), store.list(APPLICATIONS)) {
        Ok((users, jobs, applications)) => {
            let counts = (users.len(), jobs.len(), applications.len());
            Html(pages::admin_dashboard(&granted.user, Some(counts))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "admin counts failed");
            (StatusCode::BAD_GATEWAY, Html(pages::admin_dashboard(&granted.user, None))).into_response()
        }
    }
}

async fn users_page(user: &SessionUser, store: &dyn DocumentStore, error: Option<&str>) -> Response {
    match list_users(store).await {
        Ok(users) => Html(pages::admin_users_page(user, &users, error)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "user listing failed");
            (StatusCode::BAD_GATEWAY, Html(pages::admin_users_page(user, &[], Some("Failed to fetch users"))))
                .into_response()
        }
    }
}

async fn jobs_page(user: &SessionUser, store: &dyn DocumentStore, error: Option<&str>) -> Response {
    match list_jobs(store).await {
        Ok(jobs) => Html(pages::admin_jobs_page(user, &jobs, error)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "job listing failed");
            (StatusCode::BAD_GATEWAY, Html(pages::admin_jobs_page(user, &[], Some("Failed to fetch jobs"))))
                .into_response()
        }
    }
}

/// `GET /dashboard/admin/users`
pub async fn users(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::AdminUsers).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    users_page(&granted.user, granted.store.as_ref(), None).await
}

/// `POST /dashboard/admin/users/{id}/delete`
pub async fn remove_user(State(state): State<AppState>, viewer: Viewer, Path(id): Path<String>) -> Response {
    let granted = match gate(&state, &viewer, &Route::AdminUsers).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    match delete_user(granted.store.as_ref(), &id).await {
        Ok(()) => Redirect::to(&Route::AdminUsers.path()).into_response(),
        Err(e) if e.is_invalid_id() => {
            tracing::info!(user_id = %id, "delete for invalid user id");
            (StatusCode::NOT_FOUND, users_page(&granted.user, granted.store.as_ref(), Some("No such user.")).await)
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %id, "user delete failed");
            users_page(&granted.user, granted.store.as_ref(), Some("Failed to delete user")).await
        }
    }
}

/// `GET /dashboard/admin/jobs`
pub async fn jobs(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::AdminJobs).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    jobs_page(&granted.user, granted.store.as_ref(), None).await
}

/// `POST /dashboard/admin/jobs/{id}/delete`
pub async fn remove_job(State(state): State<AppState>, viewer: Viewer, Path(id): Path<String>) -> Response {
    let granted = match gate(&state, &viewer, &Route::AdminJobs).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    match delete_job(granted.store.as_ref(), &id).await {
        Ok(()) => {
            tracing::info!(job_id = %id, "job deleted");
            Redirect::to(&Route::AdminJobs.path()).into_response()
        }
        Err(e) if e.is_invalid_id() => {
            tracing::info!(job_id = %id, "delete for invalid job id");
            (StatusCode::NOT_FOUND, jobs_page(&granted.user, granted.store.as_ref(), Some("No such job.")).await)
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, job_id = %id, "job delete failed");
            jobs_page(&granted.user, granted.store.as_ref(), Some("Failed to delete job")).await
        }
    }
}
