//! Profile display and editing commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the profile
//! mingle profile show -e alice@example.com -p s3cret
//!
//! # Edit the profile fields (all three are required)
//! mingle profile edit -e alice@example.com -p s3cret \
//!     --interests "hiking, jazz" --gender other --contact 555-0100
//! ```

use mingle_client::models::FormDraft;

use super::{CommandError, NoPicker};

/// Load and print the profile for an account.
pub async fn show(email: &str, password: &str) -> Result<(), CommandError> {
    let state = super::signed_in(email, password).await?;

    let mut synchronizer = state.profile_synchronizer(NoPicker);
    synchronizer.load_profile().await?;

    let view = synchronizer.view();
    tracing::info!("Username:  {}", view.username);
    tracing::info!("Email:     {}", view.email);
    tracing::info!("Gender:    {}", view.gender);
    tracing::info!("Interests: {}", view.interests);
    tracing::info!("Contact:   {}", view.contact);
    tracing::info!("Picture:   {}", view.picture_url);

    Ok(())
}

/// Write new values for the editable profile fields.
pub async fn edit(
    email: &str,
    password: &str,
    interests: &str,
    gender: &str,
    contact: &str,
) -> Result<(), CommandError> {
    let state = super::signed_in(email, password).await?;

    let draft = FormDraft::new(interests, gender, contact);

    let mut synchronizer = state.profile_synchronizer(NoPicker);
    synchronizer.save_profile(&draft).await?;

    tracing::info!("Profile updated for {email}.");
    Ok(())
}
