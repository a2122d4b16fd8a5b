//! CLI subcommand implementations.

pub mod history;
pub mod migrate;
pub mod sign;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by the subcommands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query or migration error.
    #[error(transparent)]
    Repository(#[from] pear_bot::db::RepositoryError),

    /// Signing error.
    #[error(transparent)]
    Slack(#[from] pear_bot::slack::SlackError),
}

/// Read a required variable, loading `.env` first.
fn required_env(key: &'static str) -> Result<String, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(CommandError::MissingEnvVar(key))
}

/// Connect to `DATABASE_URL` with a small single-purpose pool.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let database_url = SecretString::from(required_env("DATABASE_URL")?);

    tracing::info!("Connecting to database...");
    let pool = pear_bot::db::create_pool(&database_url, 1, std::time::Duration::from_secs(30))
        .await?;

    Ok(pool)
}
