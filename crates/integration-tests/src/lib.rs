//! Integration tests for Mingle.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mingle-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flows` - Sign-up, sign-in, password, and sign-out flows
//! - `profile_sync` - Profile loading, editing, and avatar uploads
//!
//! The flows are exercised end to end against the in-memory doubles below,
//! which stand in for the three remote surfaces (account service, record
//! store, object store) plus the local media picker. Each double records
//! call counts and can be scripted to fail, so tests can assert both the
//! remote side effects and their absence.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use mingle_client::backend::{
    AccountApi, AccountUser, AuthTokens, BackendError, ObjectApi, ObjectEntry, RecordApi,
    RecordFilter, SignUpMetadata, UserMetadata,
};
use mingle_client::profile::{ImagePicker, PickedImage, ProfileSynchronizer};
use mingle_client::session::{SessionController, SessionHandle};
use mingle_core::{Email, UserId};

/// Table name the doubles and tests agree on.
pub const PROFILE_TABLE: &str = "users_details";

/// Bucket name the doubles and tests agree on.
pub const AVATAR_BUCKET: &str = "profile_pictures";

/// Build the error shape a remote surface reports on failure.
#[must_use]
pub fn api_error(status: u16, message: &str) -> BackendError {
    BackendError::Api {
        status,
        message: message.to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// =============================================================================
// Account service double
// =============================================================================

/// A registered identity held by [`MockAccount`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

/// Call counts recorded by [`MockAccount`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountCalls {
    pub sign_up: usize,
    pub sign_in: usize,
    pub sign_out: usize,
    pub reset: usize,
    pub update_password: usize,
}

#[derive(Default)]
struct AccountState {
    identities: Vec<Identity>,
    // Active access tokens and the identity index they belong to.
    sessions: Vec<(String, usize)>,
    reset_requests: Vec<String>,
    calls: AccountCalls,
    sign_up_failure: Option<String>,
    sign_in_failure: Option<String>,
    sign_out_failure: Option<String>,
    reset_failure: Option<String>,
    update_password_failure: Option<String>,
}

/// In-memory account service.
#[derive(Clone, Default)]
pub struct MockAccount {
    inner: Arc<Mutex<AccountState>>,
}

impl MockAccount {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sign_up(&self, message: &str) {
        lock(&self.inner).sign_up_failure = Some(message.to_string());
    }

    pub fn fail_sign_in(&self, message: &str) {
        lock(&self.inner).sign_in_failure = Some(message.to_string());
    }

    pub fn fail_sign_out(&self, message: &str) {
        lock(&self.inner).sign_out_failure = Some(message.to_string());
    }

    pub fn fail_reset(&self, message: &str) {
        lock(&self.inner).reset_failure = Some(message.to_string());
    }

    pub fn fail_update_password(&self, message: &str) {
        lock(&self.inner).update_password_failure = Some(message.to_string());
    }

    #[must_use]
    pub fn calls(&self) -> AccountCalls {
        lock(&self.inner).calls
    }

    #[must_use]
    pub fn identity(&self, email: &str) -> Option<Identity> {
        lock(&self.inner)
            .identities
            .iter()
            .find(|identity| identity.email == email)
            .cloned()
    }

    #[must_use]
    pub fn identity_count(&self) -> usize {
        lock(&self.inner).identities.len()
    }

    #[must_use]
    pub fn reset_requests(&self) -> Vec<String> {
        lock(&self.inner).reset_requests.clone()
    }

    #[must_use]
    pub fn active_session_count(&self) -> usize {
        lock(&self.inner).sessions.len()
    }
}

impl AccountApi for MockAccount {
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<AccountUser, BackendError> {
        let mut state = lock(&self.inner);
        state.calls.sign_up += 1;

        if let Some(message) = state.sign_up_failure.clone() {
            return Err(api_error(500, &message));
        }
        if state
            .identities
            .iter()
            .any(|identity| identity.email == email.as_str())
        {
            return Err(api_error(422, "User already registered"));
        }

        let identity = Identity {
            id: UserId::new(Uuid::new_v4()),
            email: email.as_str().to_string(),
            password: password.to_string(),
            username: Some(metadata.username),
        };
        state.identities.push(identity.clone());

        Ok(AccountUser {
            id: identity.id,
            email: identity.email,
            user_metadata: UserMetadata {
                username: identity.username,
            },
        })
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthTokens, BackendError> {
        let mut state = lock(&self.inner);
        state.calls.sign_in += 1;

        if let Some(message) = state.sign_in_failure.clone() {
            return Err(api_error(500, &message));
        }

        let Some((index, identity)) = state
            .identities
            .iter()
            .enumerate()
            .find(|(_, identity)| identity.email == email.as_str() && identity.password == password)
            .map(|(index, identity)| (index, identity.clone()))
        else {
            return Err(api_error(400, "Invalid login credentials"));
        };

        let token = format!("token-{}", identity.id);
        state.sessions.push((token.clone(), index));

        Ok(AuthTokens {
            access_token: SecretString::from(token),
            user: AccountUser {
                id: identity.id,
                email: identity.email,
                user_metadata: UserMetadata {
                    username: identity.username,
                },
            },
        })
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), BackendError> {
        let mut state = lock(&self.inner);
        state.calls.sign_out += 1;

        if let Some(message) = state.sign_out_failure.clone() {
            return Err(api_error(500, &message));
        }

        let token = access_token.expose_secret();
        state.sessions.retain(|(active, _)| active != token);
        Ok(())
    }

    async fn get_user(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<AccountUser>, BackendError> {
        let state = lock(&self.inner);
        let token = access_token.expose_secret();

        let user = state
            .sessions
            .iter()
            .find(|(active, _)| active == token)
            .and_then(|(_, index)| state.identities.get(*index))
            .map(|identity| AccountUser {
                id: identity.id,
                email: identity.email.clone(),
                user_metadata: UserMetadata {
                    username: identity.username.clone(),
                },
            });

        Ok(user)
    }

    async fn reset_password_for_email(&self, email: &Email) -> Result<(), BackendError> {
        let mut state = lock(&self.inner);
        state.calls.reset += 1;

        if let Some(message) = state.reset_failure.clone() {
            return Err(api_error(500, &message));
        }
        if !state
            .identities
            .iter()
            .any(|identity| identity.email == email.as_str())
        {
            return Err(api_error(404, "User not found"));
        }

        state.reset_requests.push(email.as_str().to_string());
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &SecretString,
        new_password: &str,
    ) -> Result<(), BackendError> {
        let mut state = lock(&self.inner);
        state.calls.update_password += 1;

        if let Some(message) = state.update_password_failure.clone() {
            return Err(api_error(500, &message));
        }

        let token = access_token.expose_secret();
        let Some(index) = state
            .sessions
            .iter()
            .find(|(active, _)| active == token)
            .map(|(_, index)| *index)
        else {
            return Err(api_error(401, "Invalid token"));
        };

        if let Some(identity) = state.identities.get_mut(index) {
            identity.password = new_password.to_string();
        }
        Ok(())
    }
}

// =============================================================================
// Record store double
// =============================================================================

/// Call counts recorded by [`MockRecords`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCalls {
    pub insert: usize,
    pub select: usize,
    pub update: usize,
}

#[derive(Default)]
struct RecordsState {
    tables: HashMap<String, Vec<serde_json::Value>>,
    calls: RecordCalls,
    insert_failure: Option<String>,
    select_failure: Option<String>,
    update_failure: Option<String>,
}

/// In-memory record store.
#[derive(Clone, Default)]
pub struct MockRecords {
    inner: Arc<Mutex<RecordsState>>,
}

impl MockRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_insert(&self, message: &str) {
        lock(&self.inner).insert_failure = Some(message.to_string());
    }

    pub fn fail_select(&self, message: &str) {
        lock(&self.inner).select_failure = Some(message.to_string());
    }

    pub fn fail_update(&self, message: &str) {
        lock(&self.inner).update_failure = Some(message.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = lock(&self.inner);
        state.insert_failure = None;
        state.select_failure = None;
        state.update_failure = None;
    }

    /// Place a row directly, without counting as an insert call.
    pub fn seed_row(&self, table: &str, row: serde_json::Value) {
        lock(&self.inner)
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    #[must_use]
    pub fn calls(&self) -> RecordCalls {
        lock(&self.inner).calls
    }

    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        lock(&self.inner)
            .tables
            .get(table)
            .map_or(0, std::vec::Vec::len)
    }

    /// First row whose `column` equals `value`.
    #[must_use]
    pub fn find(&self, table: &str, column: &str, value: &str) -> Option<serde_json::Value> {
        lock(&self.inner)
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| matches(row, column, value)))
            .cloned()
    }
}

fn matches(row: &serde_json::Value, column: &str, value: &str) -> bool {
    row.get(column).and_then(serde_json::Value::as_str) == Some(value)
}

fn project(row: &serde_json::Value, columns: &str) -> serde_json::Value {
    if columns == "*" {
        return row.clone();
    }

    let mut out = serde_json::Map::new();
    if let Some(object) = row.as_object() {
        for column in columns.split(',').map(str::trim) {
            if let Some(value) = object.get(column) {
                out.insert(column.to_string(), value.clone());
            }
        }
    }
    serde_json::Value::Object(out)
}

impl RecordApi for MockRecords {
    async fn insert(&self, table: &str, row: serde_json::Value) -> Result<(), BackendError> {
        let mut state = lock(&self.inner);
        state.calls.insert += 1;

        if let Some(message) = state.insert_failure.clone() {
            return Err(api_error(500, &message));
        }

        state.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn select_one(
        &self,
        table: &str,
        columns: &str,
        filter: &RecordFilter,
    ) -> Result<Option<serde_json::Value>, BackendError> {
        let mut state = lock(&self.inner);
        state.calls.select += 1;

        if let Some(message) = state.select_failure.clone() {
            return Err(api_error(500, &message));
        }

        let row = state
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| matches(row, &filter.column, &filter.value)))
            .map(|row| project(row, columns));
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        patch: serde_json::Value,
        filter: &RecordFilter,
    ) -> Result<(), BackendError> {
        let mut state = lock(&self.inner);
        state.calls.update += 1;

        if let Some(message) = state.update_failure.clone() {
            return Err(api_error(500, &message));
        }

        let Some(patch_object) = patch.as_object() else {
            return Err(api_error(400, "patch body must be an object"));
        };

        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows
                .iter_mut()
                .filter(|row| matches(row, &filter.column, &filter.value))
            {
                if let Some(object) = row.as_object_mut() {
                    for (key, value) in patch_object {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Object store double
// =============================================================================

#[derive(Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Call counts recorded by [`MockStorage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageCalls {
    pub upload: usize,
    pub list: usize,
}

#[derive(Default)]
struct StorageState {
    // Keyed by "bucket/key".
    objects: HashMap<String, StoredObject>,
    calls: StorageCalls,
    upload_failure: Option<String>,
    list_failure: Option<String>,
}

/// In-memory object store.
#[derive(Clone, Default)]
pub struct MockStorage {
    inner: Arc<Mutex<StorageState>>,
}

impl MockStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upload(&self, message: &str) {
        lock(&self.inner).upload_failure = Some(message.to_string());
    }

    pub fn fail_list(&self, message: &str) {
        lock(&self.inner).list_failure = Some(message.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = lock(&self.inner);
        state.upload_failure = None;
        state.list_failure = None;
    }

    #[must_use]
    pub fn calls(&self) -> StorageCalls {
        lock(&self.inner).calls
    }

    #[must_use]
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        lock(&self.inner)
            .objects
            .contains_key(&format!("{bucket}/{key}"))
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        lock(&self.inner).objects.len()
    }

    #[must_use]
    pub fn content_type_of(&self, bucket: &str, key: &str) -> Option<String> {
        lock(&self.inner)
            .objects
            .get(&format!("{bucket}/{key}"))
            .map(|object| object.content_type.clone())
    }
}

impl ObjectApi for MockStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let mut state = lock(&self.inner);
        state.calls.upload += 1;

        if let Some(message) = state.upload_failure.clone() {
            return Err(api_error(500, &message));
        }

        // Upsert semantics: a second upload under the same key replaces the
        // first.
        state.objects.insert(
            format!("{bucket}/{key}"),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn get_public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://cdn.test/storage/v1/object/public/{bucket}/{key}")
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: u32,
    ) -> Result<Vec<ObjectEntry>, BackendError> {
        let mut state = lock(&self.inner);
        state.calls.list += 1;

        if let Some(message) = state.list_failure.clone() {
            return Err(api_error(500, &message));
        }

        let scope = format!("{bucket}/{prefix}/");
        let entries = state
            .objects
            .keys()
            .filter_map(|full_key| full_key.strip_prefix(&scope))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|name| ObjectEntry {
                name: name.to_string(),
                updated_at: None,
            })
            .collect();
        Ok(entries)
    }
}

// =============================================================================
// Image picker double
// =============================================================================

/// Picker that replays a scripted sequence of picks.
///
/// Each call consumes one entry; an exhausted script cancels.
pub struct ScriptedPicker {
    picks: Mutex<VecDeque<Option<PickedImage>>>,
}

impl ScriptedPicker {
    /// Picker that cancels every pick.
    #[must_use]
    pub fn cancelling() -> Self {
        Self {
            picks: Mutex::new(VecDeque::new()),
        }
    }

    /// Picker that returns `image` once, then cancels.
    #[must_use]
    pub fn returning(image: PickedImage) -> Self {
        Self {
            picks: Mutex::new(VecDeque::from([Some(image)])),
        }
    }
}

impl ImagePicker for ScriptedPicker {
    async fn pick_square_image(&self) -> Option<PickedImage> {
        lock(&self.picks).pop_front().flatten()
    }
}

/// A small fake image pick for upload tests.
#[must_use]
pub fn picked_png(file_name: &str) -> PickedImage {
    PickedImage {
        local_uri: format!("file:///local/media/{file_name}"),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

// =============================================================================
// Test context
// =============================================================================

/// The full set of doubles plus the shared session handle.
#[derive(Clone, Default)]
pub struct TestContext {
    pub account: MockAccount,
    pub records: MockRecords,
    pub storage: MockStorage,
    pub session: SessionHandle,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session controller wired to the doubles.
    #[must_use]
    pub fn controller(&self) -> SessionController<MockAccount, MockRecords> {
        SessionController::new(
            self.account.clone(),
            self.records.clone(),
            self.session.clone(),
            PROFILE_TABLE,
        )
    }

    /// Profile synchronizer wired to the doubles.
    #[must_use]
    pub fn synchronizer(
        &self,
        picker: ScriptedPicker,
    ) -> ProfileSynchronizer<MockRecords, MockStorage, ScriptedPicker> {
        ProfileSynchronizer::new(
            self.records.clone(),
            self.storage.clone(),
            picker,
            self.session.clone(),
            PROFILE_TABLE,
            AVATAR_BUCKET,
        )
    }
}
