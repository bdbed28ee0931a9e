use async_trait::async_trait;
use session::{Identity, ProfileRecord, ResolveError};

use super::*;

struct NoProfiles;

#[async_trait]
impl ProfileResolver for NoProfiles {
    async fn resolve(&self, _identity: &Identity) -> Result<Option<ProfileRecord>, ResolveError> {
        Ok(None)
    }
}

fn registry(idle_ttl: Duration) -> ClientSessions {
    ClientSessions::new(Arc::new(NoProfiles), idle_ttl)
}

// =============================================================================
// ids
// =============================================================================

#[test]
fn session_id_is_64_hex_chars() {
    let id = generate_session_id();
    assert_eq!(id.len(), 64);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(id, generate_session_id());
}

#[test]
fn bytes_to_hex_pads_each_byte() {
    assert_eq!(bytes_to_hex(&[0x00, 0x0a, 0xff]), "000aff");
}

// =============================================================================
// open / get / close
// =============================================================================

#[tokio::test]
async fn open_registers_signed_out_session() {
    let sessions = registry(Duration::from_secs(60));
    let session = sessions.open().await;
    assert_eq!(sessions.len().await, 1);
    assert!(session.store().current().is_none());

    let found = sessions.get(session.id()).await.unwrap();
    assert!(Arc::ptr_eq(&found, &session));
}

#[tokio::test]
async fn unknown_id_finds_nothing() {
    let sessions = registry(Duration::from_secs(60));
    assert!(sessions.get("deadbeef").await.is_none());
}

#[tokio::test]
async fn sessions_do_not_share_identity() {
    let sessions = registry(Duration::from_secs(60));
    let a = sessions.open().await;
    let b = sessions.open().await;
    a.store().sign_in(Identity::new("u1", "u1@example.com", "t1"));
    assert!(b.store().current().is_none());
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn close_removes_and_signs_out() {
    let sessions = registry(Duration::from_secs(60));
    let session = sessions.open().await;
    session.store().sign_in(Identity::new("u1", "u1@example.com", "t1"));

    let closed = sessions.close(session.id()).await.unwrap();
    assert!(closed.store().current().is_none());
    let state = closed.auth().state();
    assert!(state.user.is_none() && !state.loading);
    assert!(sessions.is_empty().await);
    assert!(sessions.close(session.id()).await.is_none());
}

// =============================================================================
// sweep
// =============================================================================

#[tokio::test]
async fn sweep_drops_idle_sessions() {
    let sessions = registry(Duration::ZERO);
    sessions.open().await;
    sessions.open().await;
    assert_eq!(sessions.sweep_idle().await, 2);
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn sweep_keeps_active_sessions() {
    let sessions = registry(Duration::from_secs(3600));
    let session = sessions.open().await;
    assert_eq!(sessions.sweep_idle().await, 0);
    assert!(sessions.get(session.id()).await.is_some());
}

#[tokio::test]
async fn sweeper_task_runs_on_interval() {
    let sessions = registry(Duration::ZERO);
    sessions.open().await;
    let sweeper = sessions.spawn_sweeper(Duration::from_millis(10));
    for _ in 0..100 {
        if sessions.is_empty().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    sweeper.abort();
    assert!(sessions.is_empty().await);
}
