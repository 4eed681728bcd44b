//! PostgreSQL Repository Implementations

use crate::domain::entities::IssuedSeed;
use crate::domain::repository::SeedRepository;
use crate::error::PowResult;
use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;

/// PostgreSQL-backed replay store, one row per identity
#[derive(Clone)]
pub struct PgSeedRepository {
    pool: PgPool,
}

impl PgSeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired seeds
    pub async fn cleanup_expired(&self) -> PowResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let seeds_deleted = sqlx::query("DELETE FROM pow_seeds WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(seeds = seeds_deleted, "Cleaned up expired PoW seeds");

        Ok(seeds_deleted)
    }
}

impl SeedRepository for PgSeedRepository {
    async fn store(&self, seed: &IssuedSeed, ttl: Duration) -> PowResult<()> {
        let expires_at_ms = Utc::now().timestamp_millis() + ttl.as_millis() as i64;

        sqlx::query(
            r#"
            INSERT INTO pow_seeds (identity, seed, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity)
            DO UPDATE SET seed = EXCLUDED.seed, expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(&seed.identity)
        .bind(&seed.seed)
        .bind(expires_at_ms)
        .execute(&self.pool)
        .await?;

        tracing::debug!(identity = %seed.identity, "Seed stored");

        Ok(())
    }

    async fn exists(&self, seed: &IssuedSeed) -> PowResult<bool> {
        let now_ms = Utc::now().timestamp_millis();

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM pow_seeds
                WHERE identity = $1 AND seed = $2 AND expires_at_ms > $3
            )
            "#,
        )
        .bind(&seed.identity)
        .bind(&seed.seed)
        .bind(now_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete(&self, seed: &IssuedSeed) -> PowResult<()> {
        sqlx::query("DELETE FROM pow_seeds WHERE identity = $1 AND seed = $2")
            .bind(&seed.identity)
            .bind(&seed.seed)
            .execute(&self.pool)
            .await?;

        tracing::debug!(identity = %seed.identity, "Seed deleted");

        Ok(())
    }
}
