//! Fulfillment history command.
//!
//! # Usage
//!
//! ```bash
//! pear-cli history U024BE7LH
//! ```

use pear_bot::db::{PearRepository, PearStore};
use pear_bot::slack::format_history;

use super::{CommandError, connect};

/// Render the seeds `user` has picked, as the bot would show them.
///
/// # Errors
///
/// Returns error if the database is unreachable or the query fails.
pub async fn run(user: &str) -> Result<String, CommandError> {
    let repository = PearRepository::new(connect().await?);

    let history = repository.list_fulfilled_by(user).await?;
    tracing::debug!(user = %user, count = history.len(), "Loaded history");

    Ok(format_history(&history))
}
