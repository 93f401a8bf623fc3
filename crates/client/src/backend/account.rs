//! Account service client.
//!
//! Credentials, sessions, and password reset live entirely in the remote
//! account service; this module only shuttles requests to it. Sign-up can
//! attach arbitrary metadata to the new identity, which is how the chosen
//! username travels with the account.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use mingle_core::{Email, UserId};

use crate::config::BackendConfig;

use super::{BackendError, error_from_response};

// ─────────────────────────────────────────────────────────────────────────────
// Capability surface
// ─────────────────────────────────────────────────────────────────────────────

/// Remote account service operations.
///
/// One method per remote call; no validation happens here. The session
/// controller is generic over this trait so tests can substitute an
/// in-memory double.
pub trait AccountApi {
    /// Create a new identity with the given credentials and metadata.
    fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: SignUpMetadata,
    ) -> impl Future<Output = Result<AccountUser, BackendError>>;

    /// Exchange credentials for an access token and the identity it belongs to.
    fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<AuthTokens, BackendError>>;

    /// Invalidate the session behind the given access token.
    fn sign_out(
        &self,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<(), BackendError>>;

    /// Fetch the identity behind an access token, or `None` if the token is
    /// no longer valid.
    fn get_user(
        &self,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<Option<AccountUser>, BackendError>>;

    /// Request a password-reset link for the given email.
    fn reset_password_for_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<(), BackendError>>;

    /// Replace the password of the identity behind the access token.
    fn update_password(
        &self,
        access_token: &SecretString,
        new_password: &str,
    ) -> impl Future<Output = Result<(), BackendError>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata embedded into the identity at sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpMetadata {
    /// Display name chosen by the user.
    pub username: String,
}

/// Identity as reported by the account service.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUser {
    /// Service-assigned identity.
    pub id: UserId,
    /// Email the identity was created with.
    pub email: String,
    /// Free-form metadata attached at sign-up.
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Metadata stored alongside the identity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    /// Display name, if one was attached at sign-up.
    #[serde(default)]
    pub username: Option<String>,
}

/// Result of a successful password sign-in.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    /// Bearer token authorizing user-scoped calls.
    pub access_token: SecretString,
    /// The authenticated identity.
    pub user: AccountUser,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AccountUser,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the remote account service.
#[derive(Clone)]
pub struct AccountClient {
    inner: Arc<AccountClientInner>,
}

struct AccountClientInner {
    client: reqwest::Client,
    base_url: url::Url,
    anon_key: SecretString,
}

impl AccountClient {
    /// Create a new account service client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(AccountClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{path}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Build a request carrying the project key and a bearer token.
    ///
    /// Anonymous calls (sign-up, sign-in, reset) authorize with the project
    /// key itself; user-scoped calls pass the session's access token.
    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        let token = bearer.unwrap_or(&self.inner.anon_key);
        self.inner
            .client
            .request(method, self.endpoint(path))
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(token.expose_secret())
    }
}

impl AccountApi for AccountClient {
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<AccountUser, BackendError> {
        tracing::debug!(email = %email, "account sign-up");

        let body = SignUpRequest {
            email: email.as_str(),
            password,
            data: metadata,
        };

        let response = self
            .request(reqwest::Method::POST, "signup", None)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // Depending on whether email confirmation is enabled, the service
        // answers with either the bare identity or a session wrapping it.
        let value: serde_json::Value = response.json().await?;
        let user_value = value.get("user").cloned().unwrap_or(value);
        Ok(serde_json::from_value(user_value)?)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthTokens, BackendError> {
        tracing::debug!(email = %email, "account sign-in");

        let body = PasswordGrantRequest {
            email: email.as_str(),
            password,
        };

        let response = self
            .request(reqwest::Method::POST, "token?grant_type=password", None)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let tokens: TokenResponse = response.json().await?;
        Ok(AuthTokens {
            access_token: SecretString::from(tokens.access_token),
            user: tokens.user,
        })
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), BackendError> {
        tracing::debug!("account sign-out");

        let response = self
            .request(reqwest::Method::POST, "logout", Some(access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }

    async fn get_user(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<AccountUser>, BackendError> {
        let response = self
            .request(reqwest::Method::GET, "user", Some(access_token))
            .send()
            .await?;

        // An expired or revoked token is a valid "no session" answer, not
        // a failure.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let user: AccountUser = response.json().await?;
        Ok(Some(user))
    }

    async fn reset_password_for_email(&self, email: &Email) -> Result<(), BackendError> {
        tracing::debug!(email = %email, "password reset request");

        let body = serde_json::json!({ "email": email.as_str() });

        let response = self
            .request(reqwest::Method::POST, "recover", None)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &SecretString,
        new_password: &str,
    ) -> Result<(), BackendError> {
        tracing::debug!("password change");

        let body = serde_json::json!({ "password": new_password });

        let response = self
            .request(reqwest::Method::PUT, "user", Some(access_token))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}
