//! Mingle CLI - Account and profile management tools.
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
//! # Show the profile
//! mingle profile show -e alice@example.com -p s3cret
//!
//! # Upload a profile picture
//! mingle avatar upload -e alice@example.com -p s3cret -f ./avatar.png
//! ```
//!
//! # Commands
//!
//! - `account` - Sign-up, sign-in, and password management
//! - `profile` - Show and edit the profile row
//! - `avatar` - Upload and list profile pictures

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mingle")]
#[command(author, version, about = "Mingle CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the account and its session
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Show and edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage profile pictures
    Avatar {
        #[command(subcommand)]
        action: AvatarAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account and its profile row
    SignUp {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Exchange credentials for a session
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Request a password-reset link by email
    ResetPassword {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Replace the password of an existing account
    ChangePassword {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Current password
        #[arg(short, long)]
        password: String,

        /// New password
        #[arg(short, long)]
        new_password: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile for an account
    Show {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Edit the profile fields (all three are required)
    Edit {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Interests value
        #[arg(long)]
        interests: String,

        /// Gender value
        #[arg(long)]
        gender: String,

        /// Contact value
        #[arg(long)]
        contact: String,
    },
}

#[derive(Subcommand)]
enum AvatarAction {
    /// Upload a local image as the profile picture
    Upload {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Path to the image file
        #[arg(short, long)]
        file: String,
    },
    /// List stored profile pictures
    List {
        /// Key prefix to list under
        #[arg(long, default_value = "public")]
        prefix: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Account { action } => match action {
            AccountAction::SignUp {
                username,
                email,
                password,
            } => commands::account::sign_up(&username, &email, &password).await?,
            AccountAction::SignIn { email, password } => {
                commands::account::sign_in(&email, &password).await?;
            }
            AccountAction::ResetPassword { email } => {
                commands::account::reset_password(&email).await?;
            }
            AccountAction::ChangePassword {
                email,
                password,
                new_password,
            } => commands::account::change_password(&email, &password, &new_password).await?,
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show { email, password } => {
                commands::profile::show(&email, &password).await?;
            }
            ProfileAction::Edit {
                email,
                password,
                interests,
                gender,
                contact,
            } => commands::profile::edit(&email, &password, &interests, &gender, &contact).await?,
        },
        Commands::Avatar { action } => match action {
            AvatarAction::Upload {
                email,
                password,
                file,
            } => commands::avatar::upload(&email, &password, &file).await?,
            AvatarAction::List { prefix } => commands::avatar::list(&prefix).await?,
        },
    }
    Ok(())
}
