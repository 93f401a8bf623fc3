//! Session-related types.
//!
//! Local representation of the authenticated identity, plus the navigation
//! targets the flows signal to the UI layer.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use mingle_core::{Email, UserId, Username};

/// Local representation of an authenticated identity.
///
/// Created on successful sign-in, destroyed on sign-out or token
/// invalidation. Owned by the session handle; everything else reads it.
#[derive(Debug, Clone)]
pub struct Session {
    /// Identity assigned by the account service.
    pub user_id: UserId,
    /// Email the identity was created with; also the profile row key.
    pub email: Email,
    /// Display name from the identity's sign-up metadata, if present.
    pub username: Option<Username>,
    /// When this local session was established.
    pub issued_at: DateTime<Utc>,
    /// Bearer token authorizing user-scoped account calls.
    pub access_token: SecretString,
}

/// Authentication state of the app.
///
/// `Anonymous → Authenticating → Authenticated`, with `Authenticating`
/// falling back to `Anonymous` on invalid credentials. Sign-up is a side
/// path that ends in `Anonymous` with a profile row pending first login.
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    /// No identity established.
    #[default]
    Anonymous,
    /// A sign-in call is in flight.
    Authenticating,
    /// An identity is established.
    Authenticated(Session),
}

impl AuthState {
    /// Whether an identity is currently established.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Navigation target signalled to the UI after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The unauthenticated sign-in screen.
    Login,
    /// The authenticated area.
    Home,
    /// The profile view.
    Profile,
}
