//! Session lifecycle and authentication flows.
//!
//! [`SessionHandle`] is the single owner of the local [`Session`]: the
//! controller establishes and clears it, every other component reads it.
//! [`SessionController`] drives the four flows against the account service
//! and record store:
//!
//! - sign-up: create the identity, then insert the minimal profile row
//! - sign-in: exchange credentials for a session and enter the app
//! - password reset / change
//! - sign-out: always clears the local session, even if the remote call fails
//!
//! Sign-up deliberately performs no compensating delete when the profile
//! row insert fails after the identity was created; the failure is surfaced
//! and the inconsistent state is left for the next load to tolerate.

mod error;

pub use error::SessionError;

use std::sync::{Arc, RwLock};

use chrono::Utc;
use secrecy::SecretString;

use mingle_core::{Email, Username};

use crate::backend::{AccountApi, RecordApi, SignUpMetadata};
use crate::models::{AuthState, ProfileRecord, Route, Session};

/// Message shown after a password reset request is accepted.
pub const RESET_LINK_SENT: &str = "A password reset link has been sent to your email.";

// ─────────────────────────────────────────────────────────────────────────────
// Session handle
// ─────────────────────────────────────────────────────────────────────────────

/// Explicitly owned session state with a defined lifecycle.
///
/// Cheaply cloneable; the controller writes through it, consumers read
/// through it. Locks are only held for the duration of a clone, never
/// across an await point.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<AuthState>>,
}

impl SessionHandle {
    /// Create a handle in the `Anonymous` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a sign-in attempt as in flight.
    pub fn begin_authentication(&self) {
        *self.write() = AuthState::Authenticating;
    }

    /// Establish an authenticated session.
    pub fn establish(&self, session: Session) {
        *self.write() = AuthState::Authenticated(session);
    }

    /// Drop any session and return to `Anonymous`.
    pub fn clear(&self) {
        *self.write() = AuthState::Anonymous;
    }

    /// The established session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        match &*self.read() {
            AuthState::Authenticated(session) => Some(session.clone()),
            AuthState::Anonymous | AuthState::Authenticating => None,
        }
    }

    /// Snapshot of the authentication state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AuthState> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AuthState> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session controller
// ─────────────────────────────────────────────────────────────────────────────

/// Orchestrates sign-up, sign-in, password reset, and sign-out.
///
/// Generic over the account and record capabilities so tests can run the
/// flows against in-memory doubles.
pub struct SessionController<A, R> {
    account: A,
    records: R,
    session: SessionHandle,
    profile_table: String,
}

impl<A: AccountApi, R: RecordApi> SessionController<A, R> {
    /// Create a controller writing through the given session handle.
    pub fn new(
        account: A,
        records: R,
        session: SessionHandle,
        profile_table: impl Into<String>,
    ) -> Self {
        Self {
            account,
            records,
            session,
            profile_table: profile_table.into(),
        }
    }

    /// Handle the session state is written through.
    #[must_use]
    pub const fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Register a new account and its minimal profile row.
    ///
    /// Does not authenticate: on success the state stays `Anonymous` and
    /// the UI is routed to the sign-in screen.
    ///
    /// # Errors
    ///
    /// Returns a validation error (before any remote call) if a field is
    /// blank or malformed, or the failing step's service error otherwise.
    /// If the row insert fails the identity already exists remotely; no
    /// compensating delete is attempted.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Route, SessionError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.trim().is_empty() {
            return Err(SessionError::MissingRequiredFields);
        }

        let username = Username::parse(username)?;
        let email = Email::parse(email)?;

        let metadata = SignUpMetadata {
            username: username.as_str().to_string(),
        };
        let user = self.account.sign_up(&email, password, metadata).await?;

        tracing::info!(user_id = %user.id, "account created");

        let row = ProfileRecord::minimal(email.as_str(), username.as_str());
        let row = serde_json::to_value(row).map_err(crate::backend::BackendError::from)?;
        self.records.insert(&self.profile_table, row).await?;

        Ok(Route::Login)
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns the service's error verbatim on rejected credentials; the
    /// state falls back to `Anonymous`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Route, SessionError> {
        let email = Email::parse(email)?;

        self.session.begin_authentication();

        let tokens = match self.account.sign_in(&email, password).await {
            Ok(tokens) => tokens,
            Err(err) => {
                self.session.clear();
                return Err(err.into());
            }
        };

        let username = tokens
            .user
            .user_metadata
            .username
            .as_deref()
            .and_then(|name| Username::parse(name).ok());

        self.session.establish(Session {
            user_id: tokens.user.id,
            email,
            username,
            issued_at: Utc::now(),
            access_token: tokens.access_token,
        });

        tracing::info!(user_id = %tokens.user.id, "signed in");

        Ok(Route::Home)
    }

    /// Request a password-reset link.
    ///
    /// Returns the user-visible confirmation text. The service's failure
    /// message is surfaced verbatim, so whether an address is registered
    /// may be observable; see the design notes.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank or malformed email before
    /// any remote call.
    pub async fn reset_password(&self, email: &str) -> Result<&'static str, SessionError> {
        if email.trim().is_empty() {
            return Err(SessionError::MissingEmail);
        }

        let email = Email::parse(email)?;
        self.account.reset_password_for_email(&email).await?;

        Ok(RESET_LINK_SENT)
    }

    /// Replace the current user's password.
    ///
    /// The session stays valid afterwards; no re-authentication is forced.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank password, `NotAuthenticated`
    /// without a session, or the service's error verbatim.
    pub async fn change_password(&self, new_password: &str) -> Result<(), SessionError> {
        if new_password.trim().is_empty() {
            return Err(SessionError::MissingPassword);
        }

        let session = self
            .session
            .current()
            .ok_or(SessionError::NotAuthenticated)?;

        self.account
            .update_password(&session.access_token, new_password)
            .await?;

        Ok(())
    }

    /// Sign out and return to the unauthenticated area.
    ///
    /// The local session is cleared unconditionally; a failing remote
    /// invalidation is logged but never surfaced, so the user always lands
    /// back on the sign-in screen.
    pub async fn sign_out(&self) -> Route {
        let token: Option<SecretString> = self.session.current().map(|s| s.access_token);

        if let Some(token) = token
            && let Err(err) = self.account.sign_out(&token).await
        {
            tracing::warn!(error = %err, "remote sign-out failed; clearing local session anyway");
        }

        self.session.clear();
        Route::Login
    }
}
