//! Auth routes: session cookie, sign-in, registration, Google sign-in, logout.
//!
//! DESIGN
//! ======
//! The cookie names a [`ClientSession`] in the registry; it carries no identity
//! itself. A successful sign-in always opens a fresh client session (and closes
//! the old one), then signs the identity into its store. The redirect target is
//! chosen from the settled auth state, so the role that decides the dashboard is
//! the role the guard will later see.
//!
//! ERROR HANDLING
//! ==============
//! Provider rejections re-render the form with the provider's message. A sign-in
//! that succeeds but resolves to no usable profile also stays on the login page
//! with an inline message, and the half-open session is closed again.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use session::{Identity, Role, Route};
use time::Duration;

use crate::services::identity::SignInError;
use crate::services::profiles;
use crate::sessions::ClientSession;
use crate::state::AppState;
use crate::views::auth::{AuthForm, login_page, register_page};

pub(crate) const COOKIE_NAME: &str = "jobverse_session";

/// `requestUri` sent with federated sign-in. The ID-token flow only needs it to be a valid URL.
const IDP_REQUEST_URI: &str = "http://localhost";

const MISSING_PROFILE_MESSAGE: &str = "No profile found for this account. Please register first.";
const PROFILE_WRITE_MESSAGE: &str = "Could not save your profile. Please try again.";

// =============================================================================
// VIEWER EXTRACTOR
// =============================================================================

/// The client session named by the request's cookie, if it is still live.
/// Never rejects: a missing or stale cookie is simply a signed-out viewer.
pub struct Viewer {
    pub session: Option<Arc<ClientSession>>,
}

impl<S> axum::extract::FromRequestParts<S> for Viewer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let sid = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if sid.is_empty() {
            return Ok(Self { session: None });
        }
        let app_state = AppState::from_ref(state);
        Ok(Self { session: app_state.sessions.get(sid).await })
    }
}

fn session_cookie(state: &AppState, sid: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .build()
}

fn cleared_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// SIGN-IN PLUMBING
// =============================================================================

/// Which form to re-render when a sign-in cannot finish.
#[derive(Clone, Copy)]
enum Origin {
    Login,
    Register(Role),
}

fn render_form(state: &AppState, origin: Origin, status: StatusCode, email: &str, error: &str) -> Response {
    let form = AuthForm { email, error: Some(error), google_client_id: state.config.google_client_id.as_deref() };
    let html = match origin {
        Origin::Login => login_page(&form),
        Origin::Register(role) => register_page(&form, role),
    };
    (status, Html(html)).into_response()
}

fn sign_in_failure(state: &AppState, origin: Origin, email: &str, err: &SignInError) -> Response {
    let status = match err {
        SignInError::Rejected(code) => {
            tracing::info!(%code, "sign-in rejected");
            StatusCode::UNAUTHORIZED
        }
        SignInError::Unavailable(e) => {
            tracing::error!(error = %e, "identity provider unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    render_form(state, origin, status, email, err.user_message())
}

/// Swap in a fresh client session for `identity` and redirect to its dashboard.
async fn finish_sign_in(
    state: &AppState,
    viewer: Viewer,
    jar: CookieJar,
    identity: Identity,
    origin: Origin,
) -> Response {
    if let Some(old) = viewer.session {
        state.sessions.close(old.id()).await;
    }
    let session = state.sessions.open().await;
    let email = identity.email().to_owned();
    let uid = identity.uid().to_owned();
    session.store().sign_in(identity);

    let auth = session.auth().settled(state.config.settle_timeout).await;
    let target = match (&auth.user, auth.loading) {
        (Some(user), _) => Route::dashboard_for(user.role).path(),
        // Still resolving: the dashboard guard shows the placeholder until it settles.
        (None, true) => Route::Dashboard.path(),
        (None, false) => {
            tracing::warn!(%uid, "signed in without a usable profile");
            state.sessions.close(session.id()).await;
            let jar = jar.add(cleared_cookie(state));
            return (jar, render_form(state, origin, StatusCode::FORBIDDEN, &email, MISSING_PROFILE_MESSAGE))
                .into_response();
        }
    };
    tracing::info!(%uid, %target, "signed in");
    let jar = jar.add(session_cookie(state, session.id().to_owned()));
    (jar, Redirect::to(&target)).into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: String,
}

#[derive(Deserialize)]
pub struct GoogleForm {
    #[serde(default)]
    credential: String,
}

#[derive(Deserialize)]
pub struct GoogleQuery {
    #[serde(default)]
    intent: Option<String>,
}

fn blank_form(state: &AppState) -> AuthForm<'_> {
    AuthForm { google_client_id: state.config.google_client_id.as_deref(), ..AuthForm::default() }
}

/// `GET /auth/login`
pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    Html(login_page(&blank_form(&state)))
}

/// `POST /auth/login`: password sign-in.
pub async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let email = form.email.trim();
    let identity = match state.identity.sign_in(email, &form.password).await {
        Ok(identity) => identity,
        Err(e) => return sign_in_failure(&state, Origin::Login, email, &e),
    };
    finish_sign_in(&state, viewer, jar, identity, Origin::Login).await
}

/// `GET /auth/register`
pub async fn register_form(State(state): State<AppState>) -> Html<String> {
    Html(register_page(&blank_form(&state), Role::Seeker))
}

/// `POST /auth/register`: create the account, write its profile, sign in.
pub async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.trim();
    let role = if form.role.trim().is_empty() {
        Role::Seeker
    } else {
        match form.role.parse::<Role>() {
            Ok(role) if Role::SELF_SERVICE.contains(&role) => role,
            _ => {
                let origin = Origin::Register(Role::Seeker);
                return render_form(&state, origin, StatusCode::BAD_REQUEST, email, "Choose Job Seeker or Employer.");
            }
        }
    };
    let origin = Origin::Register(role);

    let identity = match state.identity.sign_up(email, &form.password).await {
        Ok(identity) => identity,
        Err(e) => return sign_in_failure(&state, origin, email, &e),
    };
    if let Err(e) = profiles::create_profile(state.store.as_ref(), &identity, role).await {
        tracing::error!(error = %e, uid = %identity.uid(), "profile write failed");
        return render_form(&state, origin, StatusCode::BAD_GATEWAY, email, PROFILE_WRITE_MESSAGE);
    }
    finish_sign_in(&state, viewer, jar, identity, origin).await
}

/// `POST /auth/google?intent=login|register`: Google Identity Services posts
/// its `credential` here.
///
/// A first-time account gets a profile: `seeker` via register, the legacy
/// `user` role via login. An existing role is never replaced.
pub async fn google(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Query(query): Query<GoogleQuery>,
    Form(form): Form<GoogleForm>,
) -> Response {
    let (origin, default_role) = match query.intent.as_deref() {
        Some("register") => (Origin::Register(Role::Seeker), Role::Seeker),
        _ => (Origin::Login, Role::User),
    };
    if form.credential.is_empty() {
        return render_form(&state, origin, StatusCode::BAD_REQUEST, "", "Google sign-in did not return a credential.");
    }
    let identity = match state.identity.sign_in_with_google(&form.credential, IDP_REQUEST_URI).await {
        Ok(identity) => identity,
        Err(e) => return sign_in_failure(&state, origin, "", &e),
    };
    match profiles::ensure_profile(state.store.as_ref(), &identity, default_role).await {
        Ok(true) => tracing::info!(uid = %identity.uid(), role = %default_role, "created profile for google account"),
        Ok(false) => {}
        Err(e) => {
            tracing::error!(error = %e, uid = %identity.uid(), "profile write failed");
            return render_form(&state, origin, StatusCode::BAD_GATEWAY, identity.email(), PROFILE_WRITE_MESSAGE);
        }
    }
    finish_sign_in(&state, viewer, jar, identity, origin).await
}

/// `POST /auth/logout`: close the client session, clear the cookie.
pub async fn logout(State(state): State<AppState>, viewer: Viewer, jar: CookieJar) -> Response {
    if let Some(session) = viewer.session {
        state.sessions.close(session.id()).await;
        tracing::info!("signed out");
    }
    let jar = jar.add(cleared_cookie(&state));
    (jar, Redirect::to(Route::Login.path().as_str())).into_response()
}
