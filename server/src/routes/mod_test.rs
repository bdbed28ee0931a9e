use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, header};
use firebase::Fields;
use http_body_util::BodyExt;
use serde_json::json;
use session::{Identity, Role};
use tower::ServiceExt;

use super::*;
use crate::config::AppConfig;
use crate::services::applications::APPLICATIONS;
use crate::services::identity::IdentityProvider;
use crate::services::jobs::JOBS;
use crate::services::memory_store::MemoryStore;
use crate::services::profiles::USERS;
use crate::services::store::{DocumentStore, StoreError, StoredDocument};
use crate::state::test_helpers::{FakeIdentityProvider, TestBackend, seed_job, seed_profile, seed_user, test_backend};

const FORM: &str = "application/x-www-form-urlencoded";

// =============================================================================
// HELPERS
// =============================================================================

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

fn get_page(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("POST").uri(uri).header(header::CONTENT_TYPE, FORM);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::from(body.to_owned())).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

/// `name=value` of a non-empty session cookie set by the response.
fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with("jobverse_session=") && pair.len() > "jobverse_session=".len())
        .map(str::to_owned)
}

fn clears_session_cookie(resp: &Response<Body>) -> bool {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("jobverse_session=;") && v.contains("Max-Age=0"))
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign in through the login form; returns the session cookie.
async fn login(app: &Router, email: &str, password: &str) -> String {
    let resp = send(app, post_form("/auth/login", &format!("email={email}&password={password}"), None)).await;
    assert_eq!(resp.status(), 303, "login should redirect");
    session_cookie(&resp).expect("login sets a session cookie")
}

fn app_for(backend: &TestBackend) -> Router {
    app(backend.state.clone())
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn seeker_visiting_employer_dashboard_is_sent_home() {
    let backend = test_backend();
    seed_user(&backend, "u1@example.com", "secret1", Role::Seeker);
    let app = app_for(&backend);

    let cookie = login(&app, "u1@example.com", "secret1").await;
    let resp = send(&app, get_page("/dashboard/employer", Some(&cookie))).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn signed_out_profile_visit_redirects_to_login() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), get_page("/profile", None)).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn registering_as_employer_opens_employer_dashboard() {
    let backend = test_backend();
    let app = app_for(&backend);

    let resp = send(&app, post_form("/auth/register", "email=boss@acme.test&password=hunter22&role=employer", None)).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/dashboard/employer");
    let cookie = session_cookie(&resp).unwrap();

    let profiles = backend.store.list(USERS).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].fields["role"], json!("employer"));
    assert_eq!(profiles[0].fields["email"], json!("boss@acme.test"));
    assert_eq!(profiles[0].fields["uid"], json!(profiles[0].id));

    let resp = send(&app, get_page("/dashboard/employer", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);
    assert!(body_text(resp).await.contains("Welcome, Employer"));
}

#[tokio::test]
async fn logout_from_seeker_dashboard_then_guard_redirects() {
    let backend = test_backend();
    seed_user(&backend, "s@example.com", "secret1", Role::Seeker);
    let app = app_for(&backend);
    let cookie = login(&app, "s@example.com", "secret1").await;

    let resp = send(&app, get_page("/dashboard/seeker", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);

    let resp = send(&app, post_form("/auth/logout", "", Some(&cookie))).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth/login");
    assert!(clears_session_cookie(&resp));
    assert!(backend.state.sessions.is_empty().await);

    let resp = send(&app, get_page("/dashboard/seeker", Some(&cookie))).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn role_change_and_profile_removal_apply_to_live_sessions() {
    let backend = test_backend();
    let uid = seed_user(&backend, "root@example.com", "secret1", Role::Admin);
    let app = app_for(&backend);
    let cookie = login(&app, "root@example.com", "secret1").await;

    let resp = send(&app, get_page("/dashboard/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);

    seed_profile(&backend.store, &uid, "root@example.com", "seeker");
    let resp = send(&app, get_page("/dashboard/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/");
    let resp = send(&app, get_page("/dashboard/seeker", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);

    backend.store.delete(USERS, &uid).await.unwrap();
    let resp = send(&app, get_page("/profile", Some(&cookie))).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn empty_job_search_renders_no_jobs_found() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), get_page("/jobs?search=engineer", None)).await;
    assert_eq!(resp.status(), 200);
    let html = body_text(resp).await;
    assert!(html.contains("No Jobs Found"));
    assert!(html.contains(r#"value="engineer""#));
}

// =============================================================================
// SIGN-IN
// =============================================================================

#[tokio::test]
async fn login_redirects_to_role_dashboard() {
    let backend = test_backend();
    seed_user(&backend, "a@example.com", "secret1", Role::Admin);
    seed_user(&backend, "old@example.com", "secret1", Role::User);
    let app = app_for(&backend);

    let resp = send(&app, post_form("/auth/login", "email=a@example.com&password=secret1", None)).await;
    assert_eq!(location(&resp), "/dashboard/admin");
    let resp = send(&app, post_form("/auth/login", "email=old@example.com&password=secret1", None)).await;
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn wrong_password_stays_on_login_with_message() {
    let backend = test_backend();
    seed_user(&backend, "u@example.com", "secret1", Role::Seeker);
    let resp = send(&app_for(&backend), post_form("/auth/login", "email=u@example.com&password=nope", None)).await;
    assert_eq!(resp.status(), 401);
    assert!(session_cookie(&resp).is_none());
    let html = body_text(resp).await;
    assert!(html.contains(r#"class="error""#));
    assert!(html.contains("Login to JobVerse"));
}

#[tokio::test]
async fn provider_outage_is_reported_inline() {
    let backend = test_backend();
    backend.identity.set_unavailable(true);
    let resp = send(&app_for(&backend), post_form("/auth/login", "email=u@example.com&password=x", None)).await;
    assert_eq!(resp.status(), 503);
    assert!(body_text(resp).await.contains("temporarily unavailable"));
}

#[tokio::test]
async fn account_without_profile_is_not_signed_in() {
    let backend = test_backend();
    backend.identity.add_account("ghost@example.com", "secret1");
    let app = app_for(&backend);

    let resp = send(&app, post_form("/auth/login", "email=ghost@example.com&password=secret1", None)).await;
    assert_eq!(resp.status(), 403);
    assert!(session_cookie(&resp).is_none());
    assert!(body_text(resp).await.contains("No profile found"));
    assert!(backend.state.sessions.is_empty().await);
}

#[tokio::test]
async fn unknown_stored_role_is_quarantined() {
    let backend = test_backend();
    let uid = backend.identity.add_account("odd@example.com", "secret1");
    seed_profile(&backend.store, &uid, "odd@example.com", "superuser");
    let app = app_for(&backend);

    let resp = send(&app, post_form("/auth/login", "email=odd@example.com&password=secret1", None)).await;
    assert_eq!(resp.status(), 403);
    let resp = send(&app, get_page("/dashboard/admin", None)).await;
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn register_rejects_admin_role() {
    let backend = test_backend();
    let resp =
        send(&app_for(&backend), post_form("/auth/register", "email=x@example.com&password=secret1&role=admin", None)).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(backend.store.count(USERS), 0);
}

#[tokio::test]
async fn register_defaults_to_seeker() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), post_form("/auth/register", "email=new@example.com&password=secret1", None)).await;
    assert_eq!(location(&resp), "/dashboard/seeker");
}

#[tokio::test]
async fn duplicate_registration_shows_provider_message() {
    let backend = test_backend();
    seed_user(&backend, "dup@example.com", "secret1", Role::Seeker);
    let resp =
        send(&app_for(&backend), post_form("/auth/register", "email=dup@example.com&password=secret1&role=seeker", None)).await;
    assert_eq!(resp.status(), 401);
    assert!(body_text(resp).await.contains("Create an Account"));
}

#[tokio::test]
async fn google_register_creates_seeker_profile() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), post_form("/auth/google?intent=register", "credential=google:g@example.com", None)).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/dashboard/seeker");
    assert_eq!(backend.store.list(USERS).await.unwrap()[0].fields["role"], json!("seeker"));
}

#[tokio::test]
async fn google_login_keeps_existing_role() {
    let backend = test_backend();
    let uid = backend.identity.add_account("boss@example.com", "");
    seed_profile(&backend.store, &uid, "boss@example.com", "employer");

    let resp = send(&app_for(&backend), post_form("/auth/google?intent=login", "credential=google:boss@example.com", None)).await;
    assert_eq!(location(&resp), "/dashboard/employer");
    assert_eq!(backend.store.get(USERS, &uid).await.unwrap().unwrap().fields["role"], json!("employer"));
}

#[tokio::test]
async fn google_login_for_new_account_uses_legacy_role() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), post_form("/auth/google", "credential=google:fresh@example.com", None)).await;
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn signing_in_again_rotates_the_session() {
    let backend = test_backend();
    seed_user(&backend, "u@example.com", "secret1", Role::Seeker);
    let app = app_for(&backend);
    let first = login(&app, "u@example.com", "secret1").await;

    let resp = send(&app, post_form("/auth/login", "email=u@example.com&password=secret1", Some(&first))).await;
    let second = session_cookie(&resp).unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.state.sessions.len().await, 1);

    let resp = send(&app, get_page("/profile", Some(&first))).await;
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn stale_cookie_is_a_signed_out_viewer() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), get_page("/dashboard", Some("jobverse_session=deadbeef"))).await;
    assert_eq!(location(&resp), "/auth/login");
}

// =============================================================================
// LOADING PLACEHOLDER
// =============================================================================

/// Store whose profile reads never finish.
#[derive(Clone, Default)]
struct StalledProfiles {
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for StalledProfiles {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        if collection == USERS {
            std::future::pending::<()>().await;
        }
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.list(collection).await
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.inner.create(collection, fields).await
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.merge(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    fn for_identity(&self, _identity: Option<&Identity>) -> Arc<dyn DocumentStore> {
        Arc::new(self.clone())
    }
}

#[tokio::test]
async fn pending_profile_lookup_shows_placeholder_not_redirect() {
    let mut config = AppConfig::for_project("test-key", "demo-jobverse");
    config.settle_timeout = Duration::from_millis(50);
    let identity = Arc::new(FakeIdentityProvider::default());
    identity.add_account("slow@example.com", "secret1");
    let state = crate::state::AppState::new(
        Arc::new(StalledProfiles::default()),
        Arc::clone(&identity) as Arc<dyn IdentityProvider>,
        config,
    );
    let app = app(state);

    let resp = send(&app, post_form("/auth/login", "email=slow@example.com&password=secret1", None)).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/dashboard");
    let cookie = session_cookie(&resp).unwrap();

    let resp = send(&app, get_page("/dashboard/seeker", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert!(resp.headers().get(header::LOCATION).is_none());
    assert!(body_text(resp).await.contains(r#"http-equiv="refresh""#));
}

// =============================================================================
// RESOURCE PAGES
// =============================================================================

#[tokio::test]
async fn seeker_applies_to_job() {
    let backend = test_backend();
    seed_user(&backend, "s@example.com", "secret1", Role::Seeker);
    seed_job(&backend.store, "j1", "Backend Developer", "ByteWorks", "Pune");
    let app = app_for(&backend);
    let cookie = login(&app, "s@example.com", "secret1").await;

    let resp = send(&app, get_page("/apply/j1", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);
    assert!(body_text(resp).await.contains("Apply for Backend Developer"));

    let resp = send(&app, post_form("/apply/j1", "message=Hire+me", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);
    assert!(body_text(resp).await.contains("Application submitted successfully!"));

    let applications = backend.store.list(APPLICATIONS).await.unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].fields["jobId"], json!("j1"));
    assert_eq!(applications[0].fields["message"], json!("Hire me"));

    let resp = send(&app, get_page("/dashboard/seeker", Some(&cookie))).await;
    assert!(body_text(resp).await.contains("Backend Developer"));
}

#[tokio::test]
async fn employer_cannot_post_applications() {
    let backend = test_backend();
    seed_user(&backend, "e@example.com", "secret1", Role::Employer);
    seed_job(&backend.store, "j1", "Backend Developer", "ByteWorks", "Pune");
    let app = app_for(&backend);
    let cookie = login(&app, "e@example.com", "secret1").await;

    let resp = send(&app, post_form("/apply/j1", "message=hi", Some(&cookie))).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/");
    assert_eq!(backend.store.count(APPLICATIONS), 0);
}

#[tokio::test]
async fn employer_posts_job_and_sees_it_listed() {
    let backend = test_backend();
    let uid = seed_user(&backend, "e@example.com", "secret1", Role::Employer);
    let app = app_for(&backend);
    let cookie = login(&app, "e@example.com", "secret1").await;

    let form = "title=Rust+Engineer&company=Acme&location=Remote&type=Remote&description=Ferris+wrangling";
    let resp = send(&app, post_form("/dashboard/employer/post-job", form, Some(&cookie))).await;
    assert_eq!(resp.status(), 200);
    assert!(body_text(resp).await.contains("Job posted successfully!"));

    let jobs = backend.store.list(JOBS).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].fields["employerId"], json!(uid));

    let resp = send(&app, get_page("/jobs?search=rust", None)).await;
    assert!(body_text(resp).await.contains("Rust Engineer"));
    let resp = send(&app, get_page("/dashboard/employer", Some(&cookie))).await;
    assert!(body_text(resp).await.contains("Rust Engineer"));
}

#[tokio::test]
async fn post_job_with_blank_title_is_rejected() {
    let backend = test_backend();
    seed_user(&backend, "e@example.com", "secret1", Role::Employer);
    let app = app_for(&backend);
    let cookie = login(&app, "e@example.com", "secret1").await;

    let form = "title=&company=Acme&location=Remote&type=Remote&description=x";
    let resp = send(&app, post_form("/dashboard/employer/post-job", form, Some(&cookie))).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(backend.store.count(JOBS), 0);
}

#[tokio::test]
async fn job_detail_and_missing_job() {
    let backend = test_backend();
    seed_job(&backend.store, "j1", "Data Analyst", "MarketX", "Delhi");
    let app = app_for(&backend);

    let resp = send(&app, get_page("/jobs/j1", None)).await;
    assert_eq!(resp.status(), 200);
    assert!(body_text(resp).await.contains("Apply Now"));

    let resp = send(&app, get_page("/jobs/missing", None)).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn job_listing_failure_is_inline_and_keeps_session() {
    let backend = test_backend();
    seed_user(&backend, "s@example.com", "secret1", Role::Seeker);
    let app = app_for(&backend);
    let cookie = login(&app, "s@example.com", "secret1").await;

    backend.store.set_failing(true);
    let resp = send(&app, get_page("/jobs", Some(&cookie))).await;
    assert_eq!(resp.status(), 502);
    let html = body_text(resp).await;
    assert!(html.contains("Failed to load jobs"));
    assert!(html.contains("Logout"));
}

#[tokio::test]
async fn admin_moderates_users_and_jobs() {
    let backend = test_backend();
    seed_user(&backend, "root@example.com", "secret1", Role::Admin);
    let victim = seed_user(&backend, "spam@example.com", "secret1", Role::Seeker);
    seed_job(&backend.store, "j1", "Scam", "Nope Inc.", "Nowhere");
    let app = app_for(&backend);
    let cookie = login(&app, "root@example.com", "secret1").await;

    let resp = send(&app, get_page("/dashboard/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), 200);
    assert!(body_text(resp).await.contains("Manage all users (2)"));

    let resp = send(&app, post_form(&format!("/dashboard/admin/users/{victim}/delete"), "", Some(&cookie))).await;
    assert_eq!(location(&resp), "/dashboard/admin/users");
    let resp = send(&app, post_form("/dashboard/admin/jobs/j1/delete", "", Some(&cookie))).await;
    assert_eq!(location(&resp), "/dashboard/admin/jobs");
    assert_eq!(backend.store.count(JOBS), 0);

    let resp = send(&app, get_page("/dashboard/admin/jobs", Some(&cookie))).await;
    assert!(body_text(resp).await.contains("No jobs found."));
    assert!(backend.store.get(USERS, &victim).await.unwrap().is_none());
}

#[tokio::test]
async fn encoded_ids_stay_inside_their_collection() {
    let backend = test_backend();
    seed_user(&backend, "root@example.com", "secret1", Role::Admin);
    let victim = seed_user(&backend, "victim@example.com", "secret1", Role::Seeker);
    seed_job(&backend.store, "j1", "Data Analyst", "MarketX", "Delhi");
    let app = app_for(&backend);

    let resp = send(&app, get_page(&format!("/jobs/..%2Fusers%2F{victim}"), None)).await;
    assert_eq!(resp.status(), 404);

    let cookie = login(&app, "root@example.com", "secret1").await;
    let uri = format!("/dashboard/admin/jobs/..%2Fusers%2F{victim}/delete");
    let resp = send(&app, post_form(&uri, "", Some(&cookie))).await;
    assert_eq!(resp.status(), 404);
    assert!(body_text(resp).await.contains("No such job."));

    let resp = send(&app, post_form("/dashboard/admin/users/..%2F..%2Fjobs%2Fj1/delete", "", Some(&cookie))).await;
    assert_eq!(resp.status(), 404);

    assert!(backend.store.get(USERS, &victim).await.unwrap().is_some());
    assert_eq!(backend.store.count(JOBS), 1);
}

#[tokio::test]
async fn non_admin_delete_is_redirected_and_ignored() {
    let backend = test_backend();
    seed_user(&backend, "s@example.com", "secret1", Role::Seeker);
    seed_job(&backend.store, "j1", "Backend Developer", "ByteWorks", "Pune");
    let app = app_for(&backend);
    let cookie = login(&app, "s@example.com", "secret1").await;

    let resp = send(&app, post_form("/dashboard/admin/jobs/j1/delete", "", Some(&cookie))).await;
    assert_eq!(location(&resp), "/");
    assert_eq!(backend.store.count(JOBS), 1);
}

#[tokio::test]
async fn healthz_is_ok() {
    let backend = test_backend();
    let resp = send(&app_for(&backend), get_page("/healthz", None)).await;
    assert_eq!(resp.status(), 200);
}
