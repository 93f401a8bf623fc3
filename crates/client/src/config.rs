//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MINGLE_BACKEND_URL` - Base URL of the backend project (e.g.,
//!   `https://abc123.supabase.co`)
//! - `MINGLE_BACKEND_ANON_KEY` - Publishable API key sent with every request
//!
//! ## Optional
//! - `MINGLE_PROFILE_TABLE` - Record store table for profile rows
//!   (default: `users_details`)
//! - `MINGLE_AVATAR_BUCKET` - Object store bucket for profile pictures
//!   (default: `profile_pictures`)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend connection settings.
    pub backend: BackendConfig,
    /// Record store table holding one profile row per email.
    pub profile_table: String,
    /// Object store bucket holding profile pictures.
    pub avatar_bucket: String,
}

/// Backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project.
    pub base_url: Url,
    /// API key sent as the `apikey` header on every request.
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            backend: BackendConfig::from_env()?,
            profile_table: get_env_or_default("MINGLE_PROFILE_TABLE", "users_details"),
            avatar_bucket: get_env_or_default("MINGLE_AVATAR_BUCKET", "profile_pictures"),
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("MINGLE_BACKEND_URL")?;
        let base_url = parse_base_url("MINGLE_BACKEND_URL", &raw_url)?;
        let anon_key = get_required_secret("MINGLE_BACKEND_ANON_KEY")?;

        if anon_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "MINGLE_BACKEND_ANON_KEY".to_string(),
                "must not be blank".to_string(),
            ));
        }

        Ok(Self { base_url, anon_key })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and normalize a base URL (no trailing slash, http(s) only).
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must have a host".to_string(),
        ));
    }

    Ok(url)
}
