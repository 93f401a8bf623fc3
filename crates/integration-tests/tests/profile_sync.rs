//! Integration tests for profile loading, editing, and avatar uploads.
//!
//! Each test signs a user in through the real session flow, then drives
//! the profile synchronizer against the in-memory doubles.

#![allow(clippy::unwrap_used)]

use mingle_client::models::{FormDraft, Route, UploadState, placeholders};
use mingle_client::profile::ProfileError;
use mingle_integration_tests::{
    AVATAR_BUCKET, PROFILE_TABLE, ScriptedPicker, TestContext, picked_png,
};

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "s3cret";

async fn signed_in_context() -> TestContext {
    let ctx = TestContext::new();
    ctx.controller()
        .sign_up("alice", EMAIL, PASSWORD)
        .await
        .unwrap();
    ctx.controller().sign_in(EMAIL, PASSWORD).await.unwrap();
    ctx
}

fn full_row() -> serde_json::Value {
    serde_json::json!({
        "email": EMAIL,
        "username": "alice",
        "gender": "other",
        "interests": "hiking, jazz",
        "contact": "555-0100",
        "profilePicture": "https://cdn.test/storage/v1/object/public/profile_pictures/public/old.png"
    })
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_load_without_session_is_noop() {
    let ctx = TestContext::new();
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    synchronizer.load_profile().await.unwrap();

    assert_eq!(ctx.records.calls().select, 0);
    assert_eq!(synchronizer.view().username, placeholders::USERNAME);
}

#[tokio::test]
async fn test_load_fresh_user_shows_placeholders() {
    let ctx = signed_in_context().await;
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    synchronizer.load_profile().await.unwrap();

    // Identity comes from the session, the rest falls back to placeholders
    // because the sign-up row has no optional columns.
    let view = synchronizer.view();
    assert_eq!(view.username, "alice");
    assert_eq!(view.email, EMAIL);
    assert_eq!(view.gender, placeholders::GENDER);
    assert_eq!(view.interests, placeholders::INTERESTS);
    assert_eq!(view.contact, placeholders::CONTACT);
    assert_eq!(view.picture_url, placeholders::AVATAR_URL);
}

#[tokio::test]
async fn test_load_merges_stored_columns() {
    let ctx = signed_in_context().await;

    // Widen the minimal sign-up row with a full set of fields.
    let draft = FormDraft::new("hiking, jazz", "other", "555-0100");
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());
    synchronizer.save_profile(&draft).await.unwrap();

    synchronizer.load_profile().await.unwrap();

    let view = synchronizer.view();
    assert_eq!(view.interests, "hiking, jazz");
    assert_eq!(view.gender, "other");
    assert_eq!(view.contact, "555-0100");
}

#[tokio::test]
async fn test_load_draft_is_blank_for_fresh_user() {
    let ctx = signed_in_context().await;
    let synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    let draft = synchronizer.load_draft().await.unwrap();

    // The edit form starts empty, not pre-filled with placeholders.
    assert_eq!(draft, FormDraft::default());
    assert!(!draft.is_complete());
}

#[tokio::test]
async fn test_load_draft_prefills_stored_values() {
    let ctx = signed_in_context().await;
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    let saved = FormDraft::new("hiking, jazz", "other", "555-0100");
    synchronizer.save_profile(&saved).await.unwrap();

    let draft = synchronizer.load_draft().await.unwrap();
    assert_eq!(draft, saved);
}

#[tokio::test]
async fn test_load_draft_ignores_other_users_rows() {
    let ctx = TestContext::new();
    ctx.records.seed_row(PROFILE_TABLE, full_row());
    ctx.controller()
        .sign_up("bob", "bob@example.com", PASSWORD)
        .await
        .unwrap();
    ctx.controller().sign_in("bob@example.com", PASSWORD).await.unwrap();

    // bob has no stored row beyond sign-up; alice's seeded row must not
    // leak into his draft.
    let synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());
    let draft = synchronizer.load_draft().await.unwrap();
    assert_eq!(draft, FormDraft::default());
}

#[tokio::test]
async fn test_load_draft_requires_session() {
    let ctx = TestContext::new();
    let synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    let err = synchronizer.load_draft().await.unwrap_err();
    assert!(matches!(err, ProfileError::NotAuthenticated));
}

// =============================================================================
// Saving
// =============================================================================

#[tokio::test]
async fn test_blank_draft_save_makes_no_remote_calls() {
    let ctx = signed_in_context().await;
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    let draft = FormDraft::new("hiking", "", "555-0100");
    let err = synchronizer.save_profile(&draft).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.to_string(), "All fields are required");
    assert_eq!(ctx.records.calls().update, 0);
}

#[tokio::test]
async fn test_save_patches_row_and_refreshes_view() {
    let ctx = signed_in_context().await;
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    let draft = FormDraft::new("hiking, jazz", "other", "555-0100");
    let route = synchronizer.save_profile(&draft).await.unwrap();

    assert_eq!(route, Route::Profile);
    assert!(!synchronizer.is_saving());

    let row = ctx.records.find(PROFILE_TABLE, "email", EMAIL).unwrap();
    assert_eq!(row.get("interests").unwrap(), "hiking, jazz");
    assert_eq!(row.get("gender").unwrap(), "other");
    assert_eq!(row.get("contact").unwrap(), "555-0100");
    // Untouched columns survive the patch.
    assert_eq!(row.get("username").unwrap(), "alice");

    assert_eq!(synchronizer.view().interests, "hiking, jazz");
}

#[tokio::test]
async fn test_save_failure_keeps_row_unchanged() {
    let ctx = signed_in_context().await;
    ctx.records.fail_update("service unavailable");
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());

    let draft = FormDraft::new("hiking", "other", "555-0100");
    let err = synchronizer.save_profile(&draft).await.unwrap_err();

    assert!(!err.is_validation());
    assert!(!synchronizer.is_saving());

    let row = ctx.records.find(PROFILE_TABLE, "email", EMAIL).unwrap();
    assert!(row.get("interests").is_none());
}

// =============================================================================
// Avatar upload
// =============================================================================

#[tokio::test]
async fn test_upload_requires_session() {
    let ctx = TestContext::new();
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::returning(picked_png("a.png")));

    let err = synchronizer.select_and_upload_image().await.unwrap_err();
    assert!(matches!(err, ProfileError::NotAuthenticated));
    assert_eq!(ctx.storage.calls().upload, 0);
}

#[tokio::test]
async fn test_upload_cancellation_changes_nothing() {
    let ctx = signed_in_context().await;
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::cancelling());
    synchronizer.load_profile().await.unwrap();

    let state = synchronizer.select_and_upload_image().await.unwrap();

    assert_eq!(state, UploadState::Idle);
    assert_eq!(ctx.storage.calls().upload, 0);
    assert_eq!(synchronizer.view().picture_url, placeholders::AVATAR_URL);
}

#[tokio::test]
async fn test_upload_commits_url_to_record() {
    let ctx = signed_in_context().await;
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::returning(picked_png("avatar.png")));
    synchronizer.load_profile().await.unwrap();

    let state = synchronizer.select_and_upload_image().await.unwrap();

    let UploadState::Committed { url } = state else {
        panic!("expected committed upload, got {state:?}");
    };

    assert!(ctx.storage.contains(AVATAR_BUCKET, "public/avatar.png"));
    assert_eq!(
        ctx.storage
            .content_type_of(AVATAR_BUCKET, "public/avatar.png")
            .as_deref(),
        Some("image/png")
    );

    let row = ctx.records.find(PROFILE_TABLE, "email", EMAIL).unwrap();
    assert_eq!(row.get("profilePicture").unwrap(), url.as_str());
    assert_eq!(synchronizer.view().picture_url, url);
}

#[tokio::test]
async fn test_upload_store_failure_persists_nothing() {
    let ctx = signed_in_context().await;
    ctx.storage.fail_upload("quota exceeded");
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::returning(picked_png("avatar.png")));
    synchronizer.load_profile().await.unwrap();

    let state = synchronizer.select_and_upload_image().await.unwrap();

    let UploadState::Failed { reason, local_uri } = state else {
        panic!("expected failed upload, got {state:?}");
    };
    assert_eq!(reason, "quota exceeded");
    assert_eq!(local_uri, "file:///local/media/avatar.png");

    // Nothing reached either remote surface; only the optimistic preview
    // is stale.
    assert_eq!(ctx.storage.object_count(), 0);
    let row = ctx.records.find(PROFILE_TABLE, "email", EMAIL).unwrap();
    assert!(row.get("profilePicture").is_none());
    assert_eq!(synchronizer.view().picture_url, local_uri);
}

#[tokio::test]
async fn test_upload_write_back_failure_orphans_asset() {
    let ctx = signed_in_context().await;
    ctx.records.fail_update("row is locked");
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::returning(picked_png("avatar.png")));
    synchronizer.load_profile().await.unwrap();

    let state = synchronizer.select_and_upload_image().await.unwrap();

    let UploadState::Failed { reason, local_uri } = state else {
        panic!("expected failed upload, got {state:?}");
    };
    assert_eq!(reason, "row is locked");

    // The asset landed in the bucket but nothing references it.
    assert!(ctx.storage.contains(AVATAR_BUCKET, "public/avatar.png"));
    let row = ctx.records.find(PROFILE_TABLE, "email", EMAIL).unwrap();
    assert!(row.get("profilePicture").is_none());
    assert_eq!(synchronizer.view().picture_url, local_uri);
}

#[tokio::test]
async fn test_reload_after_failed_upload_reverts_preview() {
    let ctx = signed_in_context().await;
    ctx.records.fail_update("row is locked");
    let mut synchronizer = ctx.synchronizer(ScriptedPicker::returning(picked_png("avatar.png")));
    synchronizer.load_profile().await.unwrap();
    synchronizer.select_and_upload_image().await.unwrap();

    ctx.records.clear_failures();
    synchronizer.load_profile().await.unwrap();

    // The stale preview is gone and the upload state is reset.
    assert_eq!(synchronizer.view().picture_url, placeholders::AVATAR_URL);
    assert_eq!(*synchronizer.upload_state(), UploadState::Idle);
}
