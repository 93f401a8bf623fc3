//! Mingle Core - Shared types library.
//!
//! This crate provides common types used across all Mingle components:
//! - `client` - Session and profile synchronization library
//! - `cli` - Command-line tool for driving the client against a backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere, including test doubles.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, usernames, and user IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
