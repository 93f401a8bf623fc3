//! Application state shared across the UI layer.

use std::sync::Arc;

use crate::backend::{AccountClient, RecordClient, StorageClient};
use crate::config::AppConfig;
use crate::profile::{ImagePicker, ProfileSynchronizer};
use crate::session::{SessionController, SessionHandle};

/// Application state shared across all screens.
///
/// Cheaply cloneable via `Arc`; owns the backend clients and the session
/// handle every flow reads through.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    account: AccountClient,
    records: RecordClient,
    storage: StorageClient,
    session: SessionHandle,
}

impl AppState {
    /// Create application state from configuration.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let account = AccountClient::new(&config.backend);
        let records = RecordClient::new(&config.backend);
        let storage = StorageClient::new(&config.backend);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                account,
                records,
                storage,
                session: SessionHandle::new(),
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the account service client.
    #[must_use]
    pub fn account(&self) -> &AccountClient {
        &self.inner.account
    }

    /// Get a reference to the record store client.
    #[must_use]
    pub fn records(&self) -> &RecordClient {
        &self.inner.records
    }

    /// Get a reference to the object store client.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// Get a reference to the shared session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// Build a session controller over the shared handle.
    #[must_use]
    pub fn session_controller(&self) -> SessionController<AccountClient, RecordClient> {
        SessionController::new(
            self.inner.account.clone(),
            self.inner.records.clone(),
            self.inner.session.clone(),
            self.inner.config.profile_table.clone(),
        )
    }

    /// Build a profile synchronizer over the shared handle.
    #[must_use]
    pub fn profile_synchronizer<P: ImagePicker>(
        &self,
        picker: P,
    ) -> ProfileSynchronizer<RecordClient, StorageClient, P> {
        ProfileSynchronizer::new(
            self.inner.records.clone(),
            self.inner.storage.clone(),
            picker,
            self.inner.session.clone(),
            self.inner.config.profile_table.clone(),
            self.inner.config.avatar_bucket.clone(),
        )
    }
}
