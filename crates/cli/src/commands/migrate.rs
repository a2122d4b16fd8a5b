//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! pear-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! The bot applies the same migrations on startup; this command exists for
//! deploy pipelines that migrate before rolling out.

use super::{CommandError, connect};

/// Apply the bot's embedded migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    pear_bot::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
