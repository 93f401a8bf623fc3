//! Profile flow error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A save was attempted with at least one blank field.
    #[error("All fields are required")]
    MissingRequiredFields,

    /// Operation requires an established session.
    #[error("You are not signed in")]
    NotAuthenticated,

    /// A remote service call failed.
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl ProfileError {
    /// Whether this failure was produced locally, before any remote call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingRequiredFields)
    }
}
