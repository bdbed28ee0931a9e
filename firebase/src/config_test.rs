use super::*;

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_firebase_env() {
    unsafe {
        std::env::remove_var("FIREBASE_API_KEY");
        std::env::remove_var("FIREBASE_PROJECT_ID");
        std::env::remove_var("FIRESTORE_DATABASE_ID");
        std::env::remove_var("HTTP_TIMEOUT_SECS");
        std::env::remove_var("FIREBASE_AUTH_EMULATOR_HOST");
        std::env::remove_var("FIRESTORE_EMULATOR_HOST");
    }
}

#[test]
fn new_uses_production_endpoints() {
    let cfg = FirebaseConfig::new("key", "jobverse");
    assert_eq!(cfg.documents_url(), "https://firestore.googleapis.com/v1/projects/jobverse/databases/(default)/documents");
    assert_eq!(cfg.accounts_url("signUp"), "https://identitytoolkit.googleapis.com/v1/accounts:signUp");
}

#[test]
fn emulators_rewrite_endpoints() {
    let cfg = FirebaseConfig::new("key", "demo").with_emulators(Some("127.0.0.1:9099"), Some("localhost:8080"));
    assert_eq!(
        cfg.accounts_url("signInWithPassword"),
        "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
    );
    assert_eq!(cfg.documents_url(), "http://localhost:8080/v1/projects/demo/databases/(default)/documents");
}

#[test]
fn blank_emulator_host_is_ignored() {
    let cfg = FirebaseConfig::new("key", "demo").with_emulators(Some("  "), None);
    assert_eq!(cfg.identity_endpoint, DEFAULT_IDENTITY_ENDPOINT);
    assert_eq!(cfg.firestore_endpoint, DEFAULT_FIRESTORE_ENDPOINT);
}

#[test]
fn from_env_requires_api_key_and_project() {
    unsafe {
        clear_firebase_env();
        std::env::set_var("FIREBASE_PROJECT_ID", "demo");
    }
    assert!(matches!(FirebaseConfig::from_env(), Err(FirebaseError::Config(_))));

    unsafe {
        clear_firebase_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
        std::env::set_var("FIREBASE_PROJECT_ID", "  ");
    }
    assert!(matches!(FirebaseConfig::from_env(), Err(FirebaseError::Config(_))));

    unsafe { clear_firebase_env() };
}

#[test]
fn from_env_reads_optional_settings() {
    unsafe {
        clear_firebase_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
        std::env::set_var("FIREBASE_PROJECT_ID", "demo");
        std::env::set_var("FIRESTORE_DATABASE_ID", "jobs-db");
        std::env::set_var("HTTP_TIMEOUT_SECS", "5");
        std::env::set_var("FIRESTORE_EMULATOR_HOST", "localhost:8080");
    }

    let cfg = FirebaseConfig::from_env().unwrap();
    assert_eq!(cfg.database_id, "jobs-db");
    assert_eq!(cfg.timeout, Duration::from_secs(5));
    assert_eq!(cfg.firestore_endpoint, "http://localhost:8080");
    assert_eq!(cfg.identity_endpoint, DEFAULT_IDENTITY_ENDPOINT);

    unsafe { clear_firebase_env() };
}

#[test]
fn from_env_ignores_unparseable_timeout() {
    unsafe {
        clear_firebase_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
        std::env::set_var("FIREBASE_PROJECT_ID", "demo");
        std::env::set_var("HTTP_TIMEOUT_SECS", "soon");
    }

    let cfg = FirebaseConfig::from_env().unwrap();
    assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

    unsafe { clear_firebase_env() };
}
