//! Avatar upload state.
//!
//! The original flow showed the picked image immediately and reconciled
//! with the store afterwards; the two-phase state below makes that
//! optimistic window explicit so it can be observed and tested.

/// An image selected locally but not yet confirmed persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Local URI of the picked asset (shown as the optimistic preview).
    pub local_uri: String,
    /// Object store key the asset will be written under.
    pub target_key: String,
    /// MIME type derived from the filename extension.
    pub content_type: String,
}

/// Lifecycle of the most recent avatar upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    /// No upload attempted since the last load.
    #[default]
    Idle,
    /// Asset picked and shown locally; remote write-back in flight.
    Pending(PendingUpload),
    /// Asset stored and its public URL written to the profile row.
    Committed {
        /// Public URL now referenced by the profile row.
        url: String,
    },
    /// Write-back failed; the local preview is still showing.
    ///
    /// When the store upload itself failed, nothing was persisted. When
    /// only the row update failed, the store now holds an orphaned asset
    /// that nothing references — deliberately left in place.
    Failed {
        /// Verbatim message from the failing step.
        reason: String,
        /// Local URI still displayed as the stale preview.
        local_uri: String,
    },
}

impl UploadState {
    /// Whether an upload chain is currently in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(UploadState::default(), UploadState::Idle);
        assert!(!UploadState::default().is_pending());
    }

    #[test]
    fn test_pending_flag() {
        let state = UploadState::Pending(PendingUpload {
            local_uri: "file:///tmp/a.png".to_string(),
            target_key: "public/a.png".to_string(),
            content_type: "image/png".to_string(),
        });
        assert!(state.is_pending());
    }
}
