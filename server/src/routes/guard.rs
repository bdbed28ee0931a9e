//! Route guarding for page handlers.
//!
//! DESIGN
//! ======
//! Handlers never inspect roles themselves. A protected handler calls
//! [`gate`] with its [`Route`]; the viewer's profile is looked up again and
//! given a short window to settle, then [`session::guard::evaluate_route`] decides. Form
//! posts gate on the same route as the page that rendered the form.
//!
//! Placeholder is a 200 that refreshes itself, never a redirect: a viewer whose
//! profile lookup is still running must not be bounced to the sign-in page.

use std::sync::Arc;

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use session::guard::{SIGN_IN_PATH, evaluate_route};
use session::{AuthState, GuardDecision, Route, SessionUser};

use super::auth::Viewer;
use crate::services::store::DocumentStore;
use crate::state::AppState;
use crate::views;

/// What an allowed handler gets to work with.
pub struct Granted {
    pub user: SessionUser,
    /// The store scoped to the viewer's identity.
    pub store: Arc<dyn DocumentStore>,
}

/// The viewer's auth state once settled, or signed-out without a session.
pub async fn viewer_state(state: &AppState, viewer: &Viewer) -> AuthState {
    match &viewer.session {
        Some(session) => session.auth().settled(state.config.settle_timeout).await,
        None => AuthState::signed_out(),
    }
}

fn viewer_store(state: &AppState, viewer: &Viewer) -> Arc<dyn DocumentStore> {
    let identity = viewer.session.as_ref().and_then(|s| s.store().current());
    state.store_for(identity.as_ref())
}

/// Guard a protected page.
///
/// # Errors
///
/// Returns the ready-to-send placeholder or redirect when the viewer may not
/// see `route` (yet).
pub async fn gate(state: &AppState, viewer: &Viewer, route: &Route) -> Result<Granted, Response> {
    if let Some(session) = &viewer.session {
        session.auth().refresh();
    }
    let auth = viewer_state(state, viewer).await;
    match evaluate_route(&auth, route) {
        GuardDecision::Placeholder => Err(placeholder()),
        GuardDecision::Redirect(target) => {
            tracing::debug!(route = %route.path(), to = target, "guard redirect");
            Err(Redirect::to(target).into_response())
        }
        GuardDecision::Allow => match auth.user {
            Some(user) => Ok(Granted { user, store: viewer_store(state, viewer) }),
            None => Err(Redirect::to(SIGN_IN_PATH).into_response()),
        },
    }
}

/// Viewer and store for a public page. Nobody is turned away.
pub async fn browse(state: &AppState, viewer: &Viewer) -> (Option<SessionUser>, Arc<dyn DocumentStore>) {
    let auth = viewer_state(state, viewer).await;
    (auth.user, viewer_store(state, viewer))
}

/// Loading page. Never cached, so the refresh really re-evaluates the guard.
#[must_use]
pub fn placeholder() -> Response {
    (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")], Html(views::placeholder_page())).into_response()
}
