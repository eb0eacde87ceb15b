//! Integration tests for the session lifecycle.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Barrier;

use helpers::{MockAuthApi, TestSession};
use tenantgate::tenantgate_core::error::{AppError, ErrorKind};
use tenantgate::tenantgate_core::traits::SessionStore;
use tenantgate::tenantgate_store::file::FileSessionStore;
use tenantgate::{SessionEvent, SessionState, SignOutReason};

#[tokio::test(start_paused = true)]
async fn test_concurrent_unauthorized_requests_refresh_once() {
    let ctx = TestSession::new(MockAuthApi::default());
    let stale = ctx.login().await;
    let barrier = Barrier::new(2);
    let calls = AtomicUsize::new(0);
    let (manager, stale_ref, barrier, calls_ref) = (&ctx.manager, &stale, &barrier, &calls);

    let fetch = move || {
        manager.with_auth_retry(move |token| {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            let stale = stale_ref.clone();
            async move {
                if token == stale {
                    barrier.wait().await;
                    Err(AppError::unauthorized("jwt expired"))
                } else {
                    Ok(token)
                }
            }
        })
    };

    let (a, b) = tokio::join!(fetch(), fetch());

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(ctx.api.refresh_calls(), 1);
    assert_eq!(a, b);
    assert_ne!(a, stale);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(ctx.manager.state(), SessionState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_many_concurrent_refresh_calls_share_one_result() {
    let ctx = TestSession::new(MockAuthApi::default());
    ctx.login().await;

    let results = refresh_concurrently(&ctx, 8).await;

    assert_eq!(ctx.api.refresh_calls(), 1);
    let first = results[0].access_token.clone();
    assert!(results.iter().all(|s| s.access_token == first));
    assert_eq!(
        ctx.manager.current().unwrap().refresh_token.as_deref(),
        Some("rt-1")
    );
}

async fn refresh_concurrently(
    ctx: &TestSession,
    n: usize,
) -> Vec<Arc<tenantgate::Session>> {
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let manager = ctx.manager.clone();
            tokio::spawn(async move { manager.refresh().await })
        })
        .collect();
    let mut sessions = Vec::with_capacity(n);
    for handle in handles {
        sessions.push(handle.await.unwrap().unwrap());
    }
    sessions
}

#[tokio::test(start_paused = true)]
async fn test_dropped_caller_does_not_abort_refresh() {
    let ctx = TestSession::new(MockAuthApi {
        refresh_delay: Duration::from_secs(1),
        ..MockAuthApi::default()
    });
    let stale = ctx.login().await;

    let caller = {
        let manager = ctx.manager.clone();
        tokio::spawn(async move { manager.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(ctx.manager.is_refresh_in_flight());
    caller.abort();

    let session = ctx.manager.refresh().await.unwrap();

    assert_eq!(ctx.api.refresh_calls(), 1);
    assert_ne!(session.access_token, stale);
    assert!(ctx.manager.is_signed_in());
}

#[tokio::test]
async fn test_cancelled_operation_keeps_session() {
    let ctx = TestSession::new(MockAuthApi::default());
    ctx.login().await;

    let err = ctx
        .manager
        .with_auth_retry(|_| async { Err::<(), _>(AppError::cancelled("view closed")) })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert_eq!(ctx.api.refresh_calls(), 0);
    assert_eq!(ctx.manager.state(), SessionState::Active);
}

#[tokio::test]
async fn test_terminal_refresh_failure_routes_to_login() {
    let ctx = TestSession::new(MockAuthApi {
        reject_refresh: true,
        refresh_delay: Duration::ZERO,
        ..MockAuthApi::default()
    });
    ctx.login().await;
    let mut events = ctx.manager.subscribe_events();

    let err = ctx
        .manager
        .with_auth_retry(|_| async { Err::<(), _>(AppError::unauthorized("expired")) })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::SessionExpired);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SignedOut {
            reason: SignOutReason::RefreshFailed,
            redirect_to: "/login".to_string(),
        }
    );
    assert!(ctx.manager.claims().is_none());
}

#[tokio::test]
async fn test_logout_ignores_server_error() {
    let ctx = TestSession::new(MockAuthApi::default());
    ctx.login().await;

    let redirect = ctx.manager.logout().await;

    assert_eq!(redirect, "/login");
    assert_eq!(ctx.api.logout_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.manager.state(), SessionState::SignedOut);
}

#[tokio::test]
async fn test_file_store_shared_between_processes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = TestSession::with_store(
        Arc::new(FileSessionStore::new(&path)),
        MockAuthApi::default(),
    );
    let token = first.login().await;

    let second = TestSession::with_store(
        Arc::new(FileSessionStore::new(&path)),
        MockAuthApi::default(),
    );
    assert_eq!(second.manager.hydrate(), SessionState::Active);
    assert_eq!(second.manager.access_token(), Some(token));

    let claims = second.manager.claims().unwrap();
    assert_eq!(claims.username, "grace");
    assert!(claims.has_permission("write:users"));
    assert_eq!(second.api.refresh_calls(), 0);

    first.manager.logout().await;
    assert_eq!(
        second.manager.check_expiry().await,
        tenantgate::tenantgate_auth::session::ExpiryCheck::SignedOut
    );
    assert!(!second.manager.is_signed_in());
}

#[tokio::test]
async fn test_hydrate_malformed_store_makes_no_call() {
    let ctx = TestSession::new(MockAuthApi::default());
    ctx.store
        .set("tenantgate:session:access_token", "not-a-token")
        .unwrap();
    ctx.store
        .set("tenantgate:session:user", "[1, 2")
        .unwrap();

    assert_eq!(ctx.manager.hydrate(), SessionState::SignedOut);
    assert_eq!(ctx.api.refresh_calls(), 0);
    assert!(ctx.store.get("tenantgate:session:access_token").unwrap().is_none());
}
