//! Profile synchronization flows.
//!
//! On session establishment the synchronizer pulls the profile row and
//! reconciles it with the in-memory [`ProfileView`]; user edits flow back
//! through single-shot writes to the record store and object store.
//!
//! The avatar upload is a two-step chain (store the bytes, then write the
//! public URL into the row) with an optimistic local preview in between.
//! Each step can fail independently: a failed store leaves nothing
//! persisted, a failed row update after a successful store leaves an
//! orphaned asset in the bucket. Neither case is retried or cleaned up;
//! the next full load reverts the view to the last persisted URL.

mod error;
mod picker;

pub use error::ProfileError;
pub use picker::{ImagePicker, PickedImage};

use mingle_core::Email;

use crate::backend::{BackendError, ObjectApi, RecordApi, RecordFilter};
use crate::models::{FormDraft, PendingUpload, ProfileRecord, ProfileView, Route, UploadState};
use crate::session::SessionHandle;

/// Keeps the in-memory profile view consistent with the remote record.
///
/// Generic over the record store, object store, and picker so tests can
/// drive the flows with in-memory doubles. Holds the view and upload state
/// the UI renders from.
pub struct ProfileSynchronizer<R, O, P> {
    records: R,
    objects: O,
    picker: P,
    session: SessionHandle,
    profile_table: String,
    avatar_bucket: String,
    view: ProfileView,
    upload: UploadState,
    saving: bool,
}

impl<R: RecordApi, O: ObjectApi, P: ImagePicker> ProfileSynchronizer<R, O, P> {
    /// Create a synchronizer reading the session through `session`.
    pub fn new(
        records: R,
        objects: O,
        picker: P,
        session: SessionHandle,
        profile_table: impl Into<String>,
        avatar_bucket: impl Into<String>,
    ) -> Self {
        Self {
            records,
            objects,
            picker,
            session,
            profile_table: profile_table.into(),
            avatar_bucket: avatar_bucket.into(),
            view: ProfileView::default(),
            upload: UploadState::Idle,
            saving: false,
        }
    }

    /// Current in-memory profile view.
    #[must_use]
    pub const fn view(&self) -> &ProfileView {
        &self.view
    }

    /// State of the most recent avatar upload.
    #[must_use]
    pub const fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    /// Whether a field save is in flight (the UI's re-entry guard).
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    /// Load the profile for the current session.
    ///
    /// Without a session this is a no-op. Identity fields come from the
    /// session itself; the rest from the profile row, with placeholders
    /// for a missing row or null columns. A successful load also resets
    /// the upload state, reverting any stale optimistic preview.
    ///
    /// # Errors
    ///
    /// Returns the record store's error verbatim if the row query fails;
    /// identity fields are still populated in that case.
    pub async fn load_profile(&mut self) -> Result<(), ProfileError> {
        let Some(session) = self.session.current() else {
            return Ok(());
        };

        let username = session.username.as_ref().map(mingle_core::Username::as_str);
        let email = session.email.as_str();

        // Identity fields render even if the row query fails below.
        self.view = ProfileView::from_record(username, email, None);

        let row = self
            .records
            .select_one(
                &self.profile_table,
                ProfileRecord::VIEW_COLUMNS,
                &Self::by_email(&session.email),
            )
            .await?;

        let record = row
            .map(serde_json::from_value::<ProfileRecord>)
            .transpose()
            .map_err(BackendError::from)?;

        self.view = ProfileView::from_record(username, email, record.as_ref());
        self.upload = UploadState::Idle;

        Ok(())
    }

    /// Fetch the raw editable fields to pre-fill the edit form.
    ///
    /// Unlike the view, missing values come back as empty strings rather
    /// than placeholders, so the form starts blank for a new user.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or the record store's
    /// error verbatim.
    pub async fn load_draft(&self) -> Result<FormDraft, ProfileError> {
        let session = self
            .session
            .current()
            .ok_or(ProfileError::NotAuthenticated)?;

        let row = self
            .records
            .select_one(
                &self.profile_table,
                ProfileRecord::EDIT_COLUMNS,
                &Self::by_email(&session.email),
            )
            .await?;

        let record = row
            .map(serde_json::from_value::<ProfileRecord>)
            .transpose()
            .map_err(BackendError::from)?
            .unwrap_or_default();

        Ok(FormDraft::new(
            record.interests.unwrap_or_default(),
            record.gender.unwrap_or_default(),
            record.contact.unwrap_or_default(),
        ))
    }

    /// Pick a square image and write it back as the new profile picture.
    ///
    /// Cancellation changes nothing. A selection immediately becomes the
    /// local preview, then the chain runs strictly in sequence: store the
    /// bytes, derive the public URL, write it into the row. Step failures
    /// land in [`UploadState::Failed`] with the service's message, leaving
    /// the optimistic preview (and, after a successful store, an orphaned
    /// asset) in place.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session. Remote failures are
    /// reported through the returned [`UploadState`], not as errors.
    pub async fn select_and_upload_image(&mut self) -> Result<UploadState, ProfileError> {
        let session = self
            .session
            .current()
            .ok_or(ProfileError::NotAuthenticated)?;

        let Some(picked) = self.picker.pick_square_image().await else {
            return Ok(self.upload.clone());
        };

        let pending = PendingUpload {
            local_uri: picked.local_uri.clone(),
            target_key: format!("public/{}", picked.file_name()),
            content_type: picked.content_type(),
        };

        // Optimistic preview: show the picked asset before anything is
        // persisted.
        self.view.picture_url.clone_from(&pending.local_uri);
        self.upload = UploadState::Pending(pending.clone());

        if let Err(err) = self
            .objects
            .upload(
                &self.avatar_bucket,
                &pending.target_key,
                picked.bytes,
                &pending.content_type,
            )
            .await
        {
            tracing::warn!(error = %err, key = %pending.target_key, "avatar upload failed");
            self.upload = UploadState::Failed {
                reason: err.to_string(),
                local_uri: pending.local_uri,
            };
            return Ok(self.upload.clone());
        }

        let url = self
            .objects
            .get_public_url(&self.avatar_bucket, &pending.target_key);

        let patch = serde_json::json!({ "profilePicture": url });
        if let Err(err) = self
            .records
            .update(&self.profile_table, patch, &Self::by_email(&session.email))
            .await
        {
            // The asset is stored but nothing references it; it stays
            // orphaned in the bucket.
            tracing::warn!(error = %err, url = %url, "profile picture URL write-back failed");
            self.upload = UploadState::Failed {
                reason: err.to_string(),
                local_uri: pending.local_uri,
            };
            return Ok(self.upload.clone());
        }

        self.view.picture_url.clone_from(&url);
        self.upload = UploadState::Committed { url };

        Ok(self.upload.clone())
    }

    /// Write edited profile fields back to the record store.
    ///
    /// All-or-nothing: a blank field rejects the whole draft before any
    /// remote call. On success the view is refreshed and the UI routed
    /// back to the profile; on failure the caller's draft stays intact
    /// for retry.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredFields` for an incomplete draft,
    /// `NotAuthenticated` without a session, or the record store's error
    /// verbatim.
    pub async fn save_profile(&mut self, draft: &FormDraft) -> Result<Route, ProfileError> {
        let session = self
            .session
            .current()
            .ok_or(ProfileError::NotAuthenticated)?;

        if !draft.is_complete() {
            return Err(ProfileError::MissingRequiredFields);
        }

        let patch = serde_json::json!({
            "interests": draft.interests,
            "gender": draft.gender,
            "contact": draft.contact,
        });

        self.saving = true;
        let result = self
            .records
            .update(&self.profile_table, patch, &Self::by_email(&session.email))
            .await;
        self.saving = false;

        result?;

        self.view.interests.clone_from(&draft.interests);
        self.view.gender.clone_from(&draft.gender);
        self.view.contact.clone_from(&draft.contact);

        Ok(Route::Profile)
    }

    fn by_email(email: &Email) -> RecordFilter {
        RecordFilter::eq("email", email.as_str())
    }
}
