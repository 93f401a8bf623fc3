//! Domain types shared by the session and profile flows.

pub mod profile;
pub mod session;
pub mod upload;

pub use profile::{FormDraft, ProfileRecord, ProfileView, placeholders};
pub use session::{AuthState, Route, Session};
pub use upload::{PendingUpload, UploadState};
