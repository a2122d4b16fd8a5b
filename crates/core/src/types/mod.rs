//! Core types for Pear.
//!
//! This module provides type-safe wrappers for the domain concepts shared
//! between the bot and the CLI.

pub mod action;
pub mod id;

pub use action::{ActionKind, SEED_BLOCK_ID};
pub use id::*;
