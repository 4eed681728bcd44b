//! Redeem Token Use Case

use crate::application::authorizer::Authorizer;
use crate::domain::entities::IssuedSeed;
use crate::domain::repository::{ContentProvider, DifficultyManager, SeedRepository};
use crate::domain::services::stamp_resource;
use crate::error::{PowError, PowResult};
use platform::client::ClientIdentity;
use platform::crypto::constant_time_eq;
use std::sync::Arc;

/// Input DTO for redeem token
#[derive(Debug, Clone)]
pub struct RedeemTokenInput {
    /// Stamp with difficulty config merged in
    pub token: String,
    /// Seed exactly as it was issued
    pub original_seed: String,
}

/// Redeem Token Use Case
pub struct RedeemTokenUseCase<R, D, C>
where
    R: SeedRepository,
    D: DifficultyManager,
    C: ContentProvider,
{
    seed_repo: Arc<R>,
    authorizer: Arc<Authorizer<D>>,
    content: Arc<C>,
}

impl<R, D, C> RedeemTokenUseCase<R, D, C>
where
    R: SeedRepository,
    D: DifficultyManager,
    C: ContentProvider,
{
    pub fn new(seed_repo: Arc<R>, authorizer: Arc<Authorizer<D>>, content: Arc<C>) -> Self {
        Self {
            seed_repo,
            authorizer,
            content,
        }
    }

    /// Checks run in a fixed order and the first failure wins
    ///
    /// The seed is consumed as soon as it is found, before the proof is
    /// checked. A failed proof therefore burns the seed and the client has
    /// to ask for a new one.
    pub async fn execute(
        &self,
        identity: &ClientIdentity,
        input: RedeemTokenInput,
    ) -> PowResult<String> {
        let issued = IssuedSeed::new(identity, input.original_seed.as_str());
        if !self.seed_repo.exists(&issued).await? {
            return Err(PowError::AuthNotRequested);
        }
        if let Err(e) = self.seed_repo.delete(&issued).await {
            tracing::warn!(identity = %identity, error = %e, "Failed to delete redeemed seed");
        }

        let (stamp, token_cfg) = self
            .authorizer
            .parse_config_from(&input.token)
            .map_err(PowError::InvalidToken)?;
        let (seed_payload, seed_cfg) = self
            .authorizer
            .parse_config_from(&input.original_seed)
            .map_err(PowError::InvalidSeed)?;

        if token_cfg != seed_cfg {
            return Err(PowError::DifficultyMismatch);
        }

        if let Some(resource) = stamp_resource(stamp) {
            if !constant_time_eq(resource.as_bytes(), seed_payload.as_bytes()) {
                return Err(PowError::SeedMismatch);
            }
        }

        if !self.authorizer.check(stamp, &token_cfg) {
            return Err(PowError::InvalidProof);
        }

        tracing::info!(
            identity = %identity,
            difficulty = token_cfg.difficulty_level_percent,
            "Proof of work accepted"
        );

        Ok(self.content.get_content())
    }
}
