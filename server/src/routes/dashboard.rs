//! Role dashboards, the post-job form, and the profile page.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use session::Route;

use super::auth::Viewer;
use super::guard::gate;
use crate::services::applications::applications_for;
use crate::services::jobs::{JobError, NewJob, create_job, list_jobs};
use crate::state::AppState;
use crate::views::dashboard as pages;

/// `GET /dashboard`: any signed-in viewer.
pub async fn general(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::Dashboard).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    Html(pages::user_dashboard(&granted.user)).into_response()
}

/// `GET /dashboard/seeker`
pub async fn seeker(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::SeekerDashboard).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    match applications_for(granted.store.as_ref(), &granted.user.uid).await {
        Ok(applications) => Html(pages::seeker_dashboard(&granted.user, &applications, None)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "application listing failed");
            let html = pages::seeker_dashboard(&granted.user, &[], Some("Failed to load your applications."));
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `GET /dashboard/employer`
pub async fn employer(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::EmployerDashboard).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    match list_jobs(granted.store.as_ref()).await {
        Ok(jobs) => {
            let mine: Vec<_> =
                jobs.into_iter().filter(|job| job.employer_id.as_deref() == Some(granted.user.uid.as_str())).collect();
            Html(pages::employer_dashboard(&granted.user, &mine, None)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "job listing failed");
            let html = pages::employer_dashboard(&granted.user, &[], Some("Failed to load your postings."));
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `GET /dashboard/employer/post-job`
pub async fn post_job_form(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::PostJob).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    Html(pages::post_job_page(&granted.user, &NewJob::default(), false, None)).into_response()
}

/// `POST /dashboard/employer/post-job`
pub async fn post_job(State(state): State<AppState>, viewer: Viewer, Form(form): Form<NewJob>) -> Response {
    let granted = match gate(&state, &viewer, &Route::PostJob).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    match create_job(granted.store.as_ref(), &granted.user, form.clone()).await {
        Ok(id) => {
            tracing::info!(job_id = %id, employer = %granted.user.uid, "job posted");
            Html(pages::post_job_page(&granted.user, &NewJob::default(), true, None)).into_response()
        }
        Err(JobError::Invalid(message)) => {
            (StatusCode::BAD_REQUEST, Html(pages::post_job_page(&granted.user, &form, false, Some(&message))))
                .into_response()
        }
        Err(JobError::Store(e)) => {
            tracing::error!(error = %e, "job write failed");
            let html = pages::post_job_page(&granted.user, &form, false, Some("Failed to post job"));
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

/// `GET /profile`
pub async fn profile(State(state): State<AppState>, viewer: Viewer) -> Response {
    let granted = match gate(&state, &viewer, &Route::Profile).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };
    Html(pages::profile_page(&granted.user)).into_response()
}
