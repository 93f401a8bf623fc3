//! Record store client.
//!
//! Row access over the backend's REST surface: insert a row, select at most
//! one row, patch rows matching a single equality filter. The profile table
//! is keyed by email, so the filter is always `email=eq.<address>` in
//! practice, but the surface stays table-agnostic.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::config::BackendConfig;

use super::{BackendError, error_from_response};

// ─────────────────────────────────────────────────────────────────────────────
// Capability surface
// ─────────────────────────────────────────────────────────────────────────────

/// Remote record store operations.
pub trait RecordApi {
    /// Insert a single row into `table`.
    fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> impl Future<Output = Result<(), BackendError>>;

    /// Fetch at most one row matching `filter`, with the given columns.
    ///
    /// Zero matching rows is a valid answer (`None`), never an error.
    fn select_one(
        &self,
        table: &str,
        columns: &str,
        filter: &RecordFilter,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, BackendError>>;

    /// Apply `patch` to every row matching `filter`.
    fn update(
        &self,
        table: &str,
        patch: serde_json::Value,
        filter: &RecordFilter,
    ) -> impl Future<Output = Result<(), BackendError>>;
}

/// A single-column equality filter.
///
/// The only filter shape this app ever issues; rows are addressed by their
/// unique email column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// Column to compare.
    pub column: String,
    /// Value the column must equal.
    pub value: String,
}

impl RecordFilter {
    /// Build an equality filter on `column`.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Render the filter as a query-string fragment (`email=eq.a%40x.com`).
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{}=eq.{}", self.column, urlencoding::encode(&self.value))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the remote record store.
#[derive(Clone)]
pub struct RecordClient {
    inner: Arc<RecordClientInner>,
}

struct RecordClientInner {
    client: reqwest::Client,
    base_url: url::Url,
    anon_key: SecretString,
}

impl RecordClient {
    /// Create a new record store client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(RecordClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.inner.anon_key.expose_secret())
    }
}

impl RecordApi for RecordClient {
    async fn insert(&self, table: &str, row: serde_json::Value) -> Result<(), BackendError> {
        tracing::debug!(table, "record insert");

        let response = self
            .request(reqwest::Method::POST, self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }

    async fn select_one(
        &self,
        table: &str,
        columns: &str,
        filter: &RecordFilter,
    ) -> Result<Option<serde_json::Value>, BackendError> {
        tracing::debug!(table, %columns, "record select");

        let url = format!(
            "{}?select={}&{}&limit=1",
            self.table_url(table),
            urlencoding::encode(columns),
            filter.to_query()
        );

        let response = self.request(reqwest::Method::GET, url).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let mut rows: Vec<serde_json::Value> = response.json().await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    async fn update(
        &self,
        table: &str,
        patch: serde_json::Value,
        filter: &RecordFilter,
    ) -> Result<(), BackendError> {
        tracing::debug!(table, filter = %filter.to_query(), "record update");

        let url = format!("{}?{}", self.table_url(table), filter.to_query());

        let response = self
            .request(reqwest::Method::PATCH, url)
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            base_url: url::Url::parse("https://abc123.supabase.co").unwrap(),
            anon_key: SecretString::from("anon-key"),
        }
    }

    #[test]
    fn test_filter_query_encodes_value() {
        let filter = RecordFilter::eq("email", "a@x.com");
        assert_eq!(filter.to_query(), "email=eq.a%40x.com");
    }

    #[test]
    fn test_filter_query_plain_value() {
        let filter = RecordFilter::eq("username", "alice");
        assert_eq!(filter.to_query(), "username=eq.alice");
    }

    #[test]
    fn test_table_url() {
        let client = RecordClient::new(&config());
        assert_eq!(
            client.table_url("users_details"),
            "https://abc123.supabase.co/rest/v1/users_details"
        );
    }
}
