//! Repository Traits
//!
//! Interfaces for persistence and collaborators. Implementations live in the
//! infrastructure and presentation layers.

use crate::domain::entities::IssuedSeed;
use crate::error::{ClientError, PowResult};
use std::time::Duration;

/// Replay-protection store for issued seeds
#[trait_variant::make(SeedRepository: Send)]
pub trait LocalSeedRepository {
    /// Remember a seed until `ttl` elapses, replacing the identity's previous seed
    async fn store(&self, seed: &IssuedSeed, ttl: Duration) -> PowResult<()>;

    /// Whether the seed was issued to this identity and has not expired
    async fn exists(&self, seed: &IssuedSeed) -> PowResult<bool>;

    /// Forget a seed if it is still the identity's current one
    async fn delete(&self, seed: &IssuedSeed) -> PowResult<()>;
}

/// Source of the current difficulty level
#[trait_variant::make(DifficultyManager: Send)]
pub trait LocalDifficultyManager {
    /// Count one gated check. Never blocks.
    fn record_request(&self);

    /// Adjust the level toward the target rate and return it
    async fn current_difficulty_percent(&self) -> PowResult<i32>;
}

/// Content released once a proof is accepted
pub trait ContentProvider: Send + Sync {
    fn get_content(&self) -> String;
}

/// Server side of the admission protocol, as seen by a client
#[trait_variant::make(AdmissionGateway: Send)]
pub trait LocalAdmissionGateway {
    /// Ask for a fresh seed (difficulty config merged in)
    async fn request_seed(&self) -> Result<String, ClientError>;

    /// Exchange a solved token and its seed for content
    async fn request_data(&self, token: &str, seed: &str) -> Result<String, ClientError>;
}
