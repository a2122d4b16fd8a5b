//! Pear Core - Shared types library.
//!
//! This crate provides common types used across all Pear components:
//! - `bot` - Slack webhook server (slash command and button interactions)
//! - `cli` - Command-line tools for migrations and local testing
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the interaction action kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
