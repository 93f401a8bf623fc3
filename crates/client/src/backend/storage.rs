//! Object store client.
//!
//! Binary assets (profile pictures) live under `bucket/key` names and are
//! served back through public URLs. Keys are derived from the original
//! filename, so a second upload under the same name overwrites the first;
//! uploads therefore always request upsert semantics.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::BackendConfig;

use super::{BackendError, error_from_response};

// ─────────────────────────────────────────────────────────────────────────────
// Capability surface
// ─────────────────────────────────────────────────────────────────────────────

/// Remote object store operations.
pub trait ObjectApi {
    /// Store `bytes` under `bucket/key`, overwriting any existing object.
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), BackendError>>;

    /// Public URL under which `bucket/key` is served.
    ///
    /// Derived locally from the base URL; never a remote call and valid
    /// even for keys that were never uploaded.
    fn get_public_url(&self, bucket: &str, key: &str) -> String;

    /// List up to `limit` objects under `prefix`.
    fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ObjectEntry>, BackendError>>;
}

/// A stored object as reported by a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntry {
    /// Object name relative to the listed prefix.
    pub name: String,
    /// Last modification timestamp, if the store reports one.
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the remote object store.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: url::Url,
    anon_key: SecretString,
}

impl StorageClient {
    /// Create a new object store client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    fn base(&self) -> &str {
        self.inner.base_url.as_str().trim_end_matches('/')
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.inner.anon_key.expose_secret())
    }
}

impl ObjectApi for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        tracing::debug!(bucket, key, size = bytes.len(), "object upload");

        let url = format!("{}/storage/v1/object/{bucket}/{}", self.base(), encode_key(key));

        let response = self
            .request(reqwest::Method::POST, url)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }

    fn get_public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{}",
            self.base(),
            encode_key(key)
        )
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: u32,
    ) -> Result<Vec<ObjectEntry>, BackendError> {
        tracing::debug!(bucket, prefix, limit, "object list");

        let url = format!("{}/storage/v1/object/list/{bucket}", self.base());
        let body = serde_json::json!({ "prefix": prefix, "limit": limit });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let entries: Vec<ObjectEntry> = response.json().await?;
        Ok(entries)
    }
}

/// Percent-encode an object key, preserving `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        StorageClient::new(&BackendConfig {
            base_url: url::Url::parse("https://abc123.supabase.co").unwrap(),
            anon_key: SecretString::from("anon-key"),
        })
    }

    #[test]
    fn test_encode_key_preserves_slashes() {
        assert_eq!(encode_key("public/avatar.png"), "public/avatar.png");
    }

    #[test]
    fn test_encode_key_escapes_special_characters() {
        assert_eq!(
            encode_key("public/my avatar (1).png"),
            "public/my%20avatar%20%281%29.png"
        );
    }

    #[test]
    fn test_public_url_shape() {
        let url = client().get_public_url("profile_pictures", "public/avatar.png");
        assert_eq!(
            url,
            "https://abc123.supabase.co/storage/v1/object/public/profile_pictures/public/avatar.png"
        );
    }

    #[test]
    fn test_object_entry_tolerates_missing_timestamp() {
        let raw = serde_json::json!({ "name": "avatar.png" });
        let entry: ObjectEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(entry.name, "avatar.png");
        assert!(entry.updated_at.is_none());
    }
}
