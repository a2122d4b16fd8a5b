//! Database operations for the Pear `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `seed` - Learning requests (requester, topic)
//! - `pear` - Fulfillments, at most one per seed (`seed_id` is UNIQUE)
//!
//! # Migrations
//!
//! Migrations live in `crates/bot/migrations/`, are embedded at compile
//! time, and run on every bot startup. They can also be applied with:
//! ```bash
//! cargo run -p pear-cli -- migrate
//! ```

pub mod pears;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pear_core::SeedId;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use crate::models::{FulfilledSeed, Pear, Seed};

pub use pears::PearRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Constraint violation (seed already picked, unknown seed, empty topic).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a sqlx error, pulling constraint violations out as `Conflict`.
    pub(crate) fn from_write(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation()
                || db_error.is_foreign_key_violation()
                || db_error.is_check_violation()
            {
                return Self::Conflict(db_error.message().to_string());
            }
        }
        Self::Database(error)
    }
}

/// Persistence operations the bot needs.
///
/// Implemented by [`PearRepository`]; tests substitute an in-memory fake.
pub trait PearStore: Send + Sync + 'static {
    /// Insert a new seed and return it with its generated ID.
    fn insert_seed(
        &self,
        requester: &str,
        topic: &str,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Seed, RepositoryError>> + Send;

    /// Fetch a seed by ID.
    fn get_seed(
        &self,
        id: SeedId,
    ) -> impl Future<Output = Result<Option<Seed>, RepositoryError>> + Send;

    /// Record that `fulfiller` picked a seed.
    ///
    /// Fails with `RepositoryError::Conflict` if the seed does not exist or
    /// was already picked.
    fn insert_pear(
        &self,
        seed_id: SeedId,
        fulfiller: &str,
        fulfilled_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Pear, RepositoryError>> + Send;

    /// Every seed `fulfiller` has picked, oldest first.
    fn list_fulfilled_by(
        &self,
        fulfiller: &str,
    ) -> impl Future<Output = Result<Vec<FulfilledSeed>, RepositoryError>> + Send;

    /// Check the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool.
///
/// Both acquiring a connection and every statement run on it are bounded by
/// `timeout`.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Pool size
/// * `timeout` - Acquire and statement timeout
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    max_connections: u32,
    timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url.expose_secret())?
        .options([("statement_timeout", timeout.as_millis().to_string())]);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
