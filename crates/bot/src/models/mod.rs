//! Domain models for Pear.
//!
//! Both records are append-only: Pear inserts them and reads them back for
//! history listings and notifications, but never updates or deletes them.

pub mod seed;

pub use seed::{FulfilledSeed, Pear, Seed};
