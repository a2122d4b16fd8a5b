//! Seed (learning request) and pear (fulfillment) records.

use chrono::{DateTime, Utc};
use pear_core::{PearId, SeedId};

/// A user's request to learn a topic.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Seed {
    /// Unique seed ID.
    pub id: SeedId,
    /// Slack user ID of the requester.
    pub requester: String,
    /// What the requester wants to learn. Never empty.
    pub topic: String,
    /// When the seed was recorded.
    pub created_at: DateTime<Utc>,
}

/// A second user's offer to help with a seed.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Pear {
    /// Unique pear ID.
    pub id: PearId,
    /// The seed this fulfills. Each seed is fulfilled at most once.
    pub seed_id: SeedId,
    /// Slack user ID of the fulfiller.
    pub fulfiller: String,
    /// When the offer was made.
    pub fulfilled_at: DateTime<Utc>,
}

/// A pear joined with its seed, for history listings.
///
/// The fulfiller is whoever the history was queried for.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FulfilledSeed {
    /// Slack user ID of the original requester.
    pub requester: String,
    /// What the requester wanted to learn.
    pub topic: String,
    /// When the offer was made.
    pub fulfilled_at: DateTime<Utc>,
}
