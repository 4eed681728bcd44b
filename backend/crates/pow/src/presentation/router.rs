//! PoW Router
//!
//! Dispatches decoded requests by message type.

use crate::application::authorizer::Authorizer;
use crate::application::config::PowConfig;
use crate::domain::repository::{ContentProvider, DifficultyManager, SeedRepository};
use crate::error::PowError;
use crate::presentation::codec::MessageType;
use crate::presentation::dto::{Request, Response};
use crate::presentation::handlers::{self, PowAppState};
use kernel::error::app_error::{AppError, AppResult};
use std::sync::Arc;

/// Anything that can answer a decoded request
///
/// A failed request becomes an `error` frame; it never ends the connection.
#[trait_variant::make(RequestHandler: Send)]
pub trait LocalRequestHandler {
    async fn handle(&self, request: Request) -> AppResult<Response>;
}

/// Server-side dispatcher for the admission protocol
pub struct PowRouter<R, D, C> {
    state: PowAppState<R, D, C>,
}

impl<R, D, C> PowRouter<R, D, C> {
    pub fn new(state: PowAppState<R, D, C>) -> Self {
        Self { state }
    }
}

impl<R, D, C> RequestHandler for PowRouter<R, D, C>
where
    R: SeedRepository + Send + Sync,
    D: DifficultyManager + Send + Sync,
    C: ContentProvider,
{
    async fn handle(&self, request: Request) -> AppResult<Response> {
        let result = match request.kind {
            MessageType::ClientAuthReq => handlers::issue_seed(&self.state, request).await,
            MessageType::ClientDataReq => handlers::redeem_token(&self.state, request).await,
            other => Err(PowError::UnsupportedRequestType(other.to_string())),
        };

        result.map_err(|e| {
            e.log();
            AppError::from(e)
        })
    }
}

/// Create the PoW router for any store, difficulty source and content
pub fn pow_router<R, D, C>(repo: R, difficulty: D, content: C, config: PowConfig) -> PowRouter<R, D, C>
where
    R: SeedRepository + Send + Sync,
    D: DifficultyManager + Send + Sync,
    C: ContentProvider,
{
    let authorizer = Authorizer::new(difficulty, &config);
    PowRouter::new(PowAppState {
        repo: Arc::new(repo),
        authorizer: Arc::new(authorizer),
        content: Arc::new(content),
        config: Arc::new(config),
    })
}
