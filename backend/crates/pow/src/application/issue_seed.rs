//! Issue Seed Use Case

use crate::application::authorizer::Authorizer;
use crate::application::config::PowConfig;
use crate::application::seed::SeedGenerator;
use crate::domain::entities::IssuedSeed;
use crate::domain::repository::{DifficultyManager, SeedRepository};
use crate::error::PowResult;
use chrono::{DateTime, Utc};
use platform::client::ClientIdentity;
use std::sync::Arc;

/// Issue Seed Use Case
pub struct IssueSeedUseCase<R, D>
where
    R: SeedRepository,
    D: DifficultyManager,
{
    seed_repo: Arc<R>,
    authorizer: Arc<Authorizer<D>>,
    config: Arc<PowConfig>,
}

impl<R, D> IssueSeedUseCase<R, D>
where
    R: SeedRepository,
    D: DifficultyManager,
{
    pub fn new(seed_repo: Arc<R>, authorizer: Arc<Authorizer<D>>, config: Arc<PowConfig>) -> Self {
        Self {
            seed_repo,
            authorizer,
            config,
        }
    }

    /// Returns the seed with the current difficulty merged in
    pub async fn execute(
        &self,
        identity: &ClientIdentity,
        request_time: DateTime<Utc>,
    ) -> PowResult<String> {
        let seed =
            SeedGenerator::new(self.config.seed_random_len).generate(identity, request_time)?;
        let cfg = self.authorizer.generate_config().await?;
        let merged = self.authorizer.merge_with_config(&seed, &cfg);

        self.seed_repo
            .store(&IssuedSeed::new(identity, merged.as_str()), self.config.seed_ttl)
            .await?;

        tracing::info!(
            identity = %identity,
            difficulty = cfg.difficulty_level_percent,
            bits = self.authorizer.calculate_bits_len(&cfg),
            "Issued seed"
        );

        Ok(merged)
    }
}
