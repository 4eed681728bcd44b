//! Request Quote Use Case (client side)

use crate::application::authorizer::Authorizer;
use crate::application::difficulty::NoOpDifficulty;
use crate::domain::repository::AdmissionGateway;
use crate::error::ClientError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Output DTO for request quote
#[derive(Debug, Clone)]
pub struct RequestQuoteOutput {
    pub quote: String,
    pub token: String,
    /// Time spent minting the token
    pub mint_elapsed: Duration,
}

/// Request Quote Use Case
///
/// One full cycle: ask for a seed, solve it at the difficulty the seed
/// carries, redeem the token.
pub struct RequestQuoteUseCase<G>
where
    G: AdmissionGateway,
{
    gateway: Arc<G>,
    authorizer: Arc<Authorizer<NoOpDifficulty>>,
}

impl<G> RequestQuoteUseCase<G>
where
    G: AdmissionGateway,
{
    pub fn new(gateway: Arc<G>, authorizer: Arc<Authorizer<NoOpDifficulty>>) -> Self {
        Self {
            gateway,
            authorizer,
        }
    }

    pub async fn execute(&self) -> Result<RequestQuoteOutput, ClientError> {
        let seed = self.gateway.request_seed().await?;
        let (payload, cfg) = self.authorizer.parse_config_from(&seed)?;

        tracing::debug!(
            difficulty = cfg.difficulty_level_percent,
            bits = self.authorizer.calculate_bits_len(&cfg),
            "Received seed"
        );

        // Minting is CPU-bound; keep it off the async workers
        let authorizer = Arc::clone(&self.authorizer);
        let payload = payload.to_owned();
        let started = Instant::now();
        let token =
            tokio::task::spawn_blocking(move || authorizer.generate_token(&payload, &cfg)).await??;
        let mint_elapsed = started.elapsed();

        let quote = self.gateway.request_data(&token, &seed).await?;

        Ok(RequestQuoteOutput {
            quote,
            token,
            mint_elapsed,
        })
    }
}
