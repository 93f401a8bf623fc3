//! Core types for Mingle.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod username;

pub use email::{Email, EmailError};
pub use id::UserId;
pub use username::{Username, UsernameError};
