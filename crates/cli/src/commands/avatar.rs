//! Profile picture commands.
//!
//! # Usage
//!
//! ```bash
//! # Upload a local image as the profile picture
//! mingle avatar upload -e alice@example.com -p s3cret -f ./avatar.png
//!
//! # List stored profile pictures
//! mingle avatar list --prefix public
//! ```
//!
//! # Environment Variables
//!
//! - `MINGLE_AVATAR_BUCKET` - Object store bucket (default: `profile_pictures`)

use mingle_client::backend::ObjectApi;
use mingle_client::models::UploadState;
use mingle_client::profile::PickedImage;

use super::{CommandError, StaticPicker};

const LIST_LIMIT: u32 = 100;

/// Upload a local image and set it as the profile picture.
pub async fn upload(email: &str, password: &str, file: &str) -> Result<(), CommandError> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| CommandError::FileRead {
            path: file.to_string(),
            source,
        })?;

    // Key derivation splits on forward slashes only.
    let picker = StaticPicker::new(PickedImage {
        local_uri: file.replace('\\', "/"),
        bytes,
    });

    let state = super::signed_in(email, password).await?;

    let mut synchronizer = state.profile_synchronizer(picker);
    synchronizer.load_profile().await?;

    match synchronizer.select_and_upload_image().await? {
        UploadState::Committed { url } => {
            tracing::info!("Profile picture updated: {url}");
            Ok(())
        }
        UploadState::Failed { reason, .. } => Err(CommandError::Upload(reason)),
        UploadState::Idle | UploadState::Pending(_) => {
            Err(CommandError::Upload("no image was selected".to_string()))
        }
    }
}

/// List stored profile pictures under a key prefix.
pub async fn list(prefix: &str) -> Result<(), CommandError> {
    let state = super::app_state()?;

    let entries = state
        .storage()
        .list(&state.config().avatar_bucket, prefix, LIST_LIMIT)
        .await?;

    if entries.is_empty() {
        tracing::info!("No objects under '{prefix}'.");
        return Ok(());
    }

    for entry in &entries {
        let updated = entry.updated_at.as_deref().unwrap_or("-");
        tracing::info!("{prefix}/{}  (updated {updated})", entry.name);
    }

    Ok(())
}
