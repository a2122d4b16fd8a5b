//! Business logic services for Pear.
//!
//! # Services
//!
//! - `pear` - Slash command and interaction dispatch for the seed/pear flow

pub mod pear;

pub use pear::{LIST_COMMAND, PearError, PearService};
