//! Remote capability surfaces and their HTTP clients.
//!
//! # Architecture
//!
//! The backend owns all persistence: credentials and sessions live in the
//! account service, profile rows in the record store, and profile pictures
//! in the object store. This module defines one trait per surface
//! ([`AccountApi`], [`RecordApi`], [`ObjectApi`]) so the flows above can be
//! exercised against in-memory doubles, plus `reqwest`-based clients
//! speaking the backend's REST dialect:
//!
//! - `/auth/v1/...` - accounts, sessions, password reset
//! - `/rest/v1/{table}` - row access with equality filters
//! - `/storage/v1/object/...` - binary assets with public URLs
//!
//! Every request carries the project's publishable key; user-scoped calls
//! additionally send a bearer access token. No retries, timeouts, or
//! caching are applied at this layer.

pub mod account;
pub mod records;
pub mod storage;

pub use account::{AccountApi, AccountClient, AccountUser, AuthTokens, SignUpMetadata, UserMetadata};
pub use records::{RecordApi, RecordClient, RecordFilter};
pub use storage::{ObjectApi, ObjectEntry, StorageClient};

use thiserror::Error;

/// Errors that can occur when talking to the backend services.
///
/// Service-reported messages are preserved verbatim so the UI can surface
/// them unchanged.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed before a response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    /// JSON decoding of a response body failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// Status code of the failing response, if the service answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }
}

/// Convert a non-success response into a `BackendError::Api`.
///
/// The auth, record, and storage services each wrap their message under a
/// different JSON key, so several are tried before falling back to the raw
/// body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    BackendError::Api {
        status,
        message: extract_service_message(&body),
    }
}

/// Pull a human-readable message out of a service error body.
fn extract_service_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(serde_json::Value::as_str)
                && !message.is_empty()
            {
                return message.to_string();
            }
        }
    }

    if body.trim().is_empty() {
        "service returned an empty error response".to_string()
    } else {
        body.trim().to_string()
    }
}
