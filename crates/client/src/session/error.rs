//! Session flow error types.

use thiserror::Error;

use mingle_core::{EmailError, UsernameError};

use crate::backend::BackendError;

/// Errors that can occur during session operations.
///
/// Validation variants are produced before any remote call and their
/// display strings double as the inline text shown to the user; remote
/// failures pass the service's message through verbatim.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A sign-up field was left blank.
    #[error("Please enter all required fields")]
    MissingRequiredFields,

    /// Password reset requested without an email.
    #[error("Please enter your email to reset your password")]
    MissingEmail,

    /// Password change requested with a blank password.
    #[error("Please enter a new password")]
    MissingPassword,

    /// Email present but structurally invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Username present but invalid.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Operation requires an established session.
    #[error("You are not signed in")]
    NotAuthenticated,

    /// A remote service call failed.
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl SessionError {
    /// Whether this failure was produced locally, before any remote call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredFields
                | Self::MissingEmail
                | Self::MissingPassword
                | Self::InvalidEmail(_)
                | Self::InvalidUsername(_)
        )
    }
}
