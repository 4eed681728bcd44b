//! Request Handlers

use crate::application::authorizer::Authorizer;
use crate::application::config::PowConfig;
use crate::application::issue_seed::IssueSeedUseCase;
use crate::application::redeem_token::{RedeemTokenInput, RedeemTokenUseCase};
use crate::domain::repository::{ContentProvider, DifficultyManager, SeedRepository};
use crate::error::{PowError, PowResult};
use crate::presentation::dto::{Request, Response};
use std::sync::Arc;

/// Shared state for PoW handlers
pub struct PowAppState<R, D, C> {
    pub repo: Arc<R>,
    pub authorizer: Arc<Authorizer<D>>,
    pub content: Arc<C>,
    pub config: Arc<PowConfig>,
}

impl<R, D, C> Clone for PowAppState<R, D, C> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            authorizer: Arc::clone(&self.authorizer),
            content: Arc::clone(&self.content),
            config: Arc::clone(&self.config),
        }
    }
}

/// c2s_auth_req
pub async fn issue_seed<R, D, C>(
    state: &PowAppState<R, D, C>,
    request: Request,
) -> PowResult<Response>
where
    R: SeedRepository + Send + Sync,
    D: DifficultyManager + Send + Sync,
{
    let use_case = IssueSeedUseCase::new(
        state.repo.clone(),
        state.authorizer.clone(),
        state.config.clone(),
    );

    let seed = use_case
        .execute(&request.meta.identity, request.meta.received_at)
        .await?;

    Ok(Response::auth(seed))
}

/// c2s_data_req
pub async fn redeem_token<R, D, C>(
    state: &PowAppState<R, D, C>,
    request: Request,
) -> PowResult<Response>
where
    R: SeedRepository + Send + Sync,
    D: DifficultyManager + Send + Sync,
    C: ContentProvider,
{
    let got = request.payload.len();
    let [token, original_seed]: [String; 2] = request
        .payload
        .try_into()
        .map_err(|_| PowError::InvalidPayload { expected: 2, got })?;

    let use_case = RedeemTokenUseCase::new(
        state.repo.clone(),
        state.authorizer.clone(),
        state.content.clone(),
    );

    let content = use_case
        .execute(
            &request.meta.identity,
            RedeemTokenInput {
                token,
                original_seed,
            },
        )
        .await?;

    Ok(Response::data(content))
}
