//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page is server-rendered. Public pages render for anyone; every other
//! page handler starts with [`guard::gate`] on its [`session::Route`], and the
//! form posts behind those pages gate on the same route, so a crafted POST gets
//! exactly the redirect the page would have given.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod guard;
pub mod jobs;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// All pages, form endpoints, and `/healthz`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(jobs::home))
        .route("/jobs", get(jobs::list))
        .route("/jobs/{id}", get(jobs::detail))
        .route("/apply/{id}", get(jobs::apply_form).post(jobs::apply_submit))
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/register", get(auth::register_form).post(auth::register))
        .route("/auth/google", post(auth::google))
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::general))
        .route("/dashboard/seeker", get(dashboard::seeker))
        .route("/dashboard/employer", get(dashboard::employer))
        .route("/dashboard/employer/post-job", get(dashboard::post_job_form).post(dashboard::post_job))
        .route("/dashboard/admin", get(admin::dashboard))
        .route("/dashboard/admin/users", get(admin::users))
        .route("/dashboard/admin/users/{id}/delete", post(admin::remove_user))
        .route("/dashboard/admin/jobs", get(admin::jobs))
        .route("/dashboard/admin/jobs/{id}/delete", post(admin::remove_job))
        .route("/profile", get(dashboard::profile))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
