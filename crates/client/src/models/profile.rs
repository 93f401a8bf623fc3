//! Profile row and view types.

use serde::{Deserialize, Serialize};

/// Placeholder strings shown when a profile field has no value yet.
///
/// "No profile row yet" is a valid state for a freshly signed-up user, so
/// every field has a human-readable fallback instead of an error path.
pub mod placeholders {
    /// Shown when the identity metadata carries no username.
    pub const USERNAME: &str = "No Username";
    /// Shown when the session carries no email (should not happen in practice).
    pub const EMAIL: &str = "No Email";
    /// Shown when the gender column is null or the row is absent.
    pub const GENDER: &str = "Not specified";
    /// Shown when the interests column is null or the row is absent.
    pub const INTERESTS: &str = "No interests";
    /// Shown when the contact column is null or the row is absent.
    pub const CONTACT: &str = "No contact info";
    /// Default avatar shown until a picture is uploaded.
    pub const AVATAR_URL: &str =
        "https://i.pinimg.com/236x/31/f4/ea/31f4ea5f4e930b9d6c9e3e0cef0c0f7f.jpg";
}

/// The durable per-user profile row in the record store.
///
/// Exactly one row exists per email; absence means "new user", not an
/// error. Created minimally (email + username) at sign-up and widened by
/// later saves. The picture column keeps its legacy camel-case name on the
/// wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Row key; unique per user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name copied from sign-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Self-described gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Comma-separated interests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    /// Contact detail (phone or similar).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Public URL of the uploaded profile picture.
    #[serde(
        default,
        rename = "profilePicture",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_picture: Option<String>,
}

impl ProfileRecord {
    /// Columns fetched when loading the profile view.
    pub const VIEW_COLUMNS: &'static str = "gender,interests,contact,profilePicture";

    /// Columns fetched when pre-filling the edit form.
    pub const EDIT_COLUMNS: &'static str = "interests,gender,contact";

    /// Minimal row written at sign-up.
    #[must_use]
    pub fn minimal(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

/// In-memory UI state of the profile screen.
///
/// Every field is always displayable; missing remote data is replaced with
/// [`placeholders`] at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    /// Display name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Gender field.
    pub gender: String,
    /// Interests field.
    pub interests: String,
    /// Contact field.
    pub contact: String,
    /// Currently displayed picture (public URL, local preview URI, or the
    /// default avatar).
    pub picture_url: String,
}

impl Default for ProfileView {
    fn default() -> Self {
        Self {
            username: placeholders::USERNAME.to_string(),
            email: placeholders::EMAIL.to_string(),
            gender: placeholders::GENDER.to_string(),
            interests: placeholders::INTERESTS.to_string(),
            contact: placeholders::CONTACT.to_string(),
            picture_url: placeholders::AVATAR_URL.to_string(),
        }
    }
}

impl ProfileView {
    /// Build a view from identity fields and an optional profile row,
    /// substituting placeholders for anything missing.
    #[must_use]
    pub fn from_record(
        username: Option<&str>,
        email: &str,
        record: Option<&ProfileRecord>,
    ) -> Self {
        let field = |value: Option<&String>, placeholder: &str| {
            value
                .filter(|s| !s.is_empty())
                .map_or_else(|| placeholder.to_string(), Clone::clone)
        };

        Self {
            username: username
                .filter(|s| !s.is_empty())
                .unwrap_or(placeholders::USERNAME)
                .to_string(),
            email: if email.is_empty() {
                placeholders::EMAIL.to_string()
            } else {
                email.to_string()
            },
            gender: field(record.and_then(|r| r.gender.as_ref()), placeholders::GENDER),
            interests: field(
                record.and_then(|r| r.interests.as_ref()),
                placeholders::INTERESTS,
            ),
            contact: field(
                record.and_then(|r| r.contact.as_ref()),
                placeholders::CONTACT,
            ),
            picture_url: field(
                record.and_then(|r| r.profile_picture.as_ref()),
                placeholders::AVATAR_URL,
            ),
        }
    }
}

/// Uncommitted edits to the profile fields.
///
/// Owned by the edit screen; discarded on navigation away without save.
/// Saves are all-or-nothing: a blank field rejects the whole draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    /// Edited interests value.
    pub interests: String,
    /// Edited gender value.
    pub gender: String,
    /// Edited contact value.
    pub contact: String,
}

impl FormDraft {
    /// Create a draft from field values.
    #[must_use]
    pub fn new(
        interests: impl Into<String>,
        gender: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            interests: interests.into(),
            gender: gender.into(),
            contact: contact.into(),
        }
    }

    /// Whether every field has a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.interests.trim().is_empty()
            && !self.gender.trim().is_empty()
            && !self.contact.trim().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_serializes_only_key_fields() {
        let record = ProfileRecord::minimal("a@x.com", "alice");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "email": "a@x.com", "username": "alice" })
        );
    }

    #[test]
    fn test_record_parses_camel_case_picture_column() {
        let raw = serde_json::json!({
            "gender": "other",
            "interests": "climbing",
            "contact": "555-0100",
            "profilePicture": "https://cdn.example/p.png"
        });
        let record: ProfileRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(
            record.profile_picture.as_deref(),
            Some("https://cdn.example/p.png")
        );
    }

    #[test]
    fn test_view_defaults_when_row_absent() {
        let view = ProfileView::from_record(Some("alice"), "a@x.com", None);
        assert_eq!(view.username, "alice");
        assert_eq!(view.email, "a@x.com");
        assert_eq!(view.gender, placeholders::GENDER);
        assert_eq!(view.interests, placeholders::INTERESTS);
        assert_eq!(view.contact, placeholders::CONTACT);
        assert_eq!(view.picture_url, placeholders::AVATAR_URL);
    }

    #[test]
    fn test_view_defaults_null_columns() {
        let record = ProfileRecord {
            gender: Some("other".to_string()),
            ..ProfileRecord::default()
        };
        let view = ProfileView::from_record(Some("alice"), "a@x.com", Some(&record));
        assert_eq!(view.gender, "other");
        assert_eq!(view.interests, placeholders::INTERESTS);
    }

    #[test]
    fn test_view_missing_username_uses_placeholder() {
        let view = ProfileView::from_record(None, "a@x.com", None);
        assert_eq!(view.username, placeholders::USERNAME);
    }

    #[test]
    fn test_draft_completeness() {
        assert!(FormDraft::new("hiking", "other", "555-0100").is_complete());
        assert!(!FormDraft::new("", "other", "555-0100").is_complete());
        assert!(!FormDraft::new("hiking", "  ", "555-0100").is_complete());
        assert!(!FormDraft::default().is_complete());
    }
}
