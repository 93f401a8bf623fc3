//! Account and session commands.
//!
//! # Usage
//!
//! ```bash
//! # Register a new account
//! mingle account sign-up -u alice -e alice@example.com -p s3cret
//!
//! # Verify credentials
//! mingle account sign-in -e alice@example.com -p s3cret
//!
//! # Request a password-reset link
//! mingle account reset-password -e alice@example.com
//!
//! # Replace the password
//! mingle account change-password -e alice@example.com -p s3cret -n n3wpass
//! ```
//!
//! # Environment Variables
//!
//! - `MINGLE_BACKEND_URL` - Base URL of the backend project
//! - `MINGLE_BACKEND_ANON_KEY` - Publishable API key

use super::CommandError;

/// Register a new account and its minimal profile row.
pub async fn sign_up(username: &str, email: &str, password: &str) -> Result<(), CommandError> {
    let state = super::app_state()?;

    state
        .session_controller()
        .sign_up(username, email, password)
        .await?;

    tracing::info!("Account created for {email}. You can now sign in.");
    Ok(())
}

/// Exchange credentials for a session and report who signed in.
pub async fn sign_in(email: &str, password: &str) -> Result<(), CommandError> {
    let state = super::signed_in(email, password).await?;

    if let Some(session) = state.session().current() {
        let username = session
            .username
            .as_ref()
            .map_or("(no username)", mingle_core::Username::as_str);
        tracing::info!(
            "Signed in as {username} <{}> (user id {})",
            session.email,
            session.user_id
        );
    }

    Ok(())
}

/// Request a password-reset link by email.
pub async fn reset_password(email: &str) -> Result<(), CommandError> {
    let state = super::app_state()?;

    let message = state.session_controller().reset_password(email).await?;

    tracing::info!("{message}");
    Ok(())
}

/// Replace the password of an existing account.
pub async fn change_password(
    email: &str,
    password: &str,
    new_password: &str,
) -> Result<(), CommandError> {
    let state = super::signed_in(email, password).await?;

    state
        .session_controller()
        .change_password(new_password)
        .await?;

    tracing::info!("Password changed for {email}.");
    Ok(())
}
