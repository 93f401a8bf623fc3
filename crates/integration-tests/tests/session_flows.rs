//! Integration tests for the session flows.
//!
//! Sign-up, sign-in, password reset and change, and sign-out are driven
//! end to end against in-memory doubles, asserting both the remote side
//! effects and, for local validation failures, their absence.

#![allow(clippy::unwrap_used)]

use mingle_client::models::{AuthState, Route};
use mingle_client::session::{RESET_LINK_SENT, SessionError};
use mingle_integration_tests::{PROFILE_TABLE, TestContext};

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "s3cret";

async fn signed_up(ctx: &TestContext) {
    ctx.controller()
        .sign_up("alice", EMAIL, PASSWORD)
        .await
        .unwrap();
}

async fn signed_in(ctx: &TestContext) {
    signed_up(ctx).await;
    ctx.controller().sign_in(EMAIL, PASSWORD).await.unwrap();
}

// =============================================================================
// Sign-up
// =============================================================================

#[tokio::test]
async fn test_sign_up_creates_identity_and_profile_row() {
    let ctx = TestContext::new();

    let route = ctx
        .controller()
        .sign_up("alice", EMAIL, PASSWORD)
        .await
        .unwrap();

    // Registration routes to sign-in without establishing a session.
    assert_eq!(route, Route::Login);
    assert!(ctx.session.current().is_none());

    let identity = ctx.account.identity(EMAIL).unwrap();
    assert_eq!(identity.username.as_deref(), Some("alice"));

    // Exactly the minimal row, nothing else filled in.
    let row = ctx.records.find(PROFILE_TABLE, "email", EMAIL).unwrap();
    assert_eq!(
        row,
        serde_json::json!({ "email": EMAIL, "username": "alice" })
    );
    assert_eq!(ctx.records.row_count(PROFILE_TABLE), 1);
}

#[tokio::test]
async fn test_blank_sign_up_makes_no_remote_calls() {
    let ctx = TestContext::new();

    let err = ctx
        .controller()
        .sign_up("alice", "", PASSWORD)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Please enter all required fields");
    assert_eq!(ctx.account.calls().sign_up, 0);
    assert_eq!(ctx.records.calls().insert, 0);
}

#[tokio::test]
async fn test_malformed_email_rejected_before_remote_call() {
    let ctx = TestContext::new();

    let err = ctx
        .controller()
        .sign_up("alice", "not-an-email", PASSWORD)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(ctx.account.calls().sign_up, 0);
}

#[tokio::test]
async fn test_sign_up_row_insert_failure_leaves_identity_behind() {
    let ctx = TestContext::new();
    ctx.records
        .fail_insert("duplicate key value violates unique constraint");

    let err = ctx
        .controller()
        .sign_up("alice", EMAIL, PASSWORD)
        .await
        .unwrap_err();

    // The failure surfaces, but the identity already exists remotely and
    // no compensating delete is attempted.
    assert!(!err.is_validation());
    assert_eq!(ctx.account.identity_count(), 1);
    assert_eq!(ctx.records.row_count(PROFILE_TABLE), 0);
}

#[tokio::test]
async fn test_sign_up_duplicate_email_surfaces_service_message() {
    let ctx = TestContext::new();
    signed_up(&ctx).await;

    let err = ctx
        .controller()
        .sign_up("alice2", EMAIL, "other-password")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "User already registered");
    assert_eq!(ctx.account.identity_count(), 1);
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_sign_in_establishes_session() {
    let ctx = TestContext::new();
    signed_up(&ctx).await;

    let route = ctx.controller().sign_in(EMAIL, PASSWORD).await.unwrap();

    assert_eq!(route, Route::Home);
    assert!(ctx.session.state().is_authenticated());

    let session = ctx.session.current().unwrap();
    assert_eq!(session.email.as_str(), EMAIL);
    assert_eq!(
        session.username.as_ref().map(|u| u.as_str().to_string()),
        Some("alice".to_string())
    );
}

#[tokio::test]
async fn test_sign_in_malformed_email_rejected_locally() {
    let ctx = TestContext::new();
    signed_up(&ctx).await;

    // An unparseable address can never key a profile row, so it fails
    // fast instead of going to the service.
    let err = ctx
        .controller()
        .sign_in("not-an-email", PASSWORD)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(ctx.account.calls().sign_in, 0);
    assert!(matches!(ctx.session.state(), AuthState::Anonymous));
}

#[tokio::test]
async fn test_sign_in_rejection_returns_to_anonymous() {
    let ctx = TestContext::new();
    signed_up(&ctx).await;

    let err = ctx
        .controller()
        .sign_in(EMAIL, "wrong-password")
        .await
        .unwrap_err();

    // The service's message is surfaced verbatim.
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(matches!(ctx.session.state(), AuthState::Anonymous));
    assert!(ctx.session.current().is_none());
}

// =============================================================================
// Password reset and change
// =============================================================================

#[tokio::test]
async fn test_reset_password_returns_confirmation_text() {
    let ctx = TestContext::new();
    signed_up(&ctx).await;

    let message = ctx.controller().reset_password(EMAIL).await.unwrap();

    assert_eq!(message, RESET_LINK_SENT);
    assert_eq!(ctx.account.reset_requests(), vec![EMAIL.to_string()]);
}

#[tokio::test]
async fn test_reset_password_blank_email_is_local_error() {
    let ctx = TestContext::new();

    let err = ctx.controller().reset_password("  ").await.unwrap_err();

    assert!(matches!(err, SessionError::MissingEmail));
    assert_eq!(
        err.to_string(),
        "Please enter your email to reset your password"
    );
    assert_eq!(ctx.account.calls().reset, 0);
}

#[tokio::test]
async fn test_change_password_requires_session() {
    let ctx = TestContext::new();

    let err = ctx
        .controller()
        .change_password("new-password")
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::NotAuthenticated));
    assert_eq!(ctx.account.calls().update_password, 0);
}

#[tokio::test]
async fn test_change_password_blank_is_local_error() {
    let ctx = TestContext::new();
    signed_in(&ctx).await;

    let err = ctx.controller().change_password("   ").await.unwrap_err();

    assert!(matches!(err, SessionError::MissingPassword));
    assert_eq!(err.to_string(), "Please enter a new password");
    assert_eq!(ctx.account.calls().update_password, 0);
}

#[tokio::test]
async fn test_change_password_replaces_credential() {
    let ctx = TestContext::new();
    signed_in(&ctx).await;

    ctx.controller().change_password("n3w-password").await.unwrap();

    // The session stays valid after the change.
    assert!(ctx.session.current().is_some());

    // The old credential no longer signs in; the new one does.
    ctx.controller().sign_out().await;
    assert!(ctx.controller().sign_in(EMAIL, PASSWORD).await.is_err());
    ctx.controller().sign_in(EMAIL, "n3w-password").await.unwrap();
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn test_sign_out_clears_session() {
    let ctx = TestContext::new();
    signed_in(&ctx).await;
    assert_eq!(ctx.account.active_session_count(), 1);

    let route = ctx.controller().sign_out().await;

    assert_eq!(route, Route::Login);
    assert!(ctx.session.current().is_none());
    assert_eq!(ctx.account.active_session_count(), 0);
}

#[tokio::test]
async fn test_sign_out_clears_session_even_when_remote_call_fails() {
    let ctx = TestContext::new();
    signed_in(&ctx).await;
    ctx.account.fail_sign_out("service unavailable");

    let route = ctx.controller().sign_out().await;

    // The failure is swallowed; the user still lands on sign-in with no
    // local session.
    assert_eq!(route, Route::Login);
    assert!(ctx.session.current().is_none());
    assert_eq!(ctx.account.calls().sign_out, 1);
}

#[tokio::test]
async fn test_sign_out_invalidates_access_token() {
    use mingle_client::backend::AccountApi;

    let ctx = TestContext::new();
    signed_in(&ctx).await;
    let token = ctx.session.current().unwrap().access_token;

    let user = ctx.account.get_user(&token).await.unwrap();
    assert_eq!(user.unwrap().email, EMAIL);

    ctx.controller().sign_out().await;

    assert!(ctx.account.get_user(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_out_without_session_skips_remote_call() {
    let ctx = TestContext::new();

    let route = ctx.controller().sign_out().await;

    assert_eq!(route, Route::Login);
    assert_eq!(ctx.account.calls().sign_out, 0);
}
