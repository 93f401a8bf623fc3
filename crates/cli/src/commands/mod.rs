//! CLI command implementations.
//!
//! Each invocation is a fresh process, so user-scoped commands take the
//! account credentials, sign in, run, and exit; no session is persisted
//! between runs.

pub mod account;
pub mod avatar;
pub mod profile;

use thiserror::Error;

use mingle_client::backend::BackendError;
use mingle_client::config::{AppConfig, ConfigError};
use mingle_client::profile::{ImagePicker, PickedImage, ProfileError};
use mingle_client::session::SessionError;
use mingle_client::state::AppState;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A session flow failed.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// A profile flow failed.
    #[error("{0}")]
    Profile(#[from] ProfileError),

    /// A direct service call failed.
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// A local file could not be read.
    #[error("Could not read file {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    /// An avatar upload did not reach the committed state.
    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Load configuration and build the shared application state.
pub(crate) fn app_state() -> Result<AppState, CommandError> {
    Ok(AppState::new(AppConfig::from_env()?))
}

/// Build application state with an established session.
pub(crate) async fn signed_in(email: &str, password: &str) -> Result<AppState, CommandError> {
    let state = app_state()?;
    state.session_controller().sign_in(email, password).await?;
    Ok(state)
}

/// Picker that always returns a pre-read image.
///
/// The CLI reads the file before signing in, so a read failure aborts the
/// command instead of looking like a cancelled pick.
pub(crate) struct StaticPicker {
    image: PickedImage,
}

impl StaticPicker {
    pub(crate) const fn new(image: PickedImage) -> Self {
        Self { image }
    }
}

impl ImagePicker for StaticPicker {
    async fn pick_square_image(&self) -> Option<PickedImage> {
        Some(self.image.clone())
    }
}

/// Picker for commands that never upload.
pub(crate) struct NoPicker;

impl ImagePicker for NoPicker {
    async fn pick_square_image(&self) -> Option<PickedImage> {
        None
    }
}
