//! Mingle client library.
//!
//! Orchestrates the path from anonymous to authenticated-with-profile
//! against three remote capability surfaces: an account service, a record
//! store, and an object store. The library owns no persistence of its own;
//! every durable operation is a remote call.
//!
//! # Components
//!
//! - [`backend`] - Capability traits and HTTP clients for the three services
//! - [`session`] - Session lifecycle and the sign-up/sign-in/sign-out flows
//! - [`profile`] - Profile load, field save, and avatar upload write-back
//! - [`models`] - Domain types shared by the flows
//! - [`config`] - Environment-based configuration
//! - [`state`] - Wiring of config, clients, and session handle

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod models;
pub mod profile;
pub mod session;
pub mod state;
