//! Pear bot library.
//!
//! Slack bot that records learning requests ("seeds") and the people who
//! offer to help with them ("pears"). Exposed as a library so the binary,
//! the CLI, and the integration tests share one implementation.
//!
//! # Security
//!
//! Every webhook is authenticated with Slack's request signature before
//! its body is parsed. The bot token and signing secret are held in
//! `SecretString` and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod slack;
pub mod state;
