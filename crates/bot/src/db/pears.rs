//! Database operations for seeds and pears.
//!
//! Every write is a single autocommitted statement; nothing here spans a
//! transaction.

use chrono::{DateTime, Utc};
use pear_core::SeedId;
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::{PearStore, RepositoryError};
use crate::models::{FulfilledSeed, Pear, Seed};

/// `PostgreSQL`-backed [`PearStore`].
#[derive(Debug, Clone)]
pub struct PearRepository {
    pool: PgPool,
}

impl PearRepository {
    /// Create a new repository over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PearStore for PearRepository {
    #[instrument(skip(self, topic))]
    async fn insert_seed(
        &self,
        requester: &str,
        topic: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Seed, RepositoryError> {
        let seed = sqlx::query_as::<_, Seed>(
            r"
            INSERT INTO seed (requester, topic, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, requester, topic, created_at
            ",
        )
        .bind(requester)
        .bind(topic)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        debug!(seed_id = %seed.id, "Seed inserted");

        Ok(seed)
    }

    #[instrument(skip(self))]
    async fn get_seed(&self, id: SeedId) -> Result<Option<Seed>, RepositoryError> {
        let seed = sqlx::query_as::<_, Seed>(
            r"
            SELECT id, requester, topic, created_at
            FROM seed
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(seed)
    }

    #[instrument(skip(self))]
    async fn insert_pear(
        &self,
        seed_id: SeedId,
        fulfiller: &str,
        fulfilled_at: DateTime<Utc>,
    ) -> Result<Pear, RepositoryError> {
        let pear = sqlx::query_as::<_, Pear>(
            r"
            INSERT INTO pear (seed_id, fulfiller, fulfilled_at)
            VALUES ($1, $2, $3)
            RETURNING id, seed_id, fulfiller, fulfilled_at
            ",
        )
        .bind(seed_id)
        .bind(fulfiller)
        .bind(fulfilled_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        debug!(pear_id = %pear.id, "Pear inserted");

        Ok(pear)
    }

    #[instrument(skip(self))]
    async fn list_fulfilled_by(
        &self,
        fulfiller: &str,
    ) -> Result<Vec<FulfilledSeed>, RepositoryError> {
        let history = sqlx::query_as::<_, FulfilledSeed>(
            r"
            SELECT seed.requester, seed.topic, pear.fulfilled_at
            FROM pear
            JOIN seed ON seed.id = pear.seed_id
            WHERE pear.fulfiller = $1
            ORDER BY pear.fulfilled_at, pear.id
            ",
        )
        .bind(fulfiller)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
