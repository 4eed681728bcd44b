//! PoW (Proof of Work) Admission Module
//!
//! Clean Architecture structure:
//! - `domain/` - Stamps, difficulty config, repository traits
//! - `application/` - Authorizer, difficulty controller, use cases
//! - `infra/` - Replay store and content implementations
//! - `presentation/` - Wire codec, TCP connection loop, listener, client
//!
//! ## Security Model
//! - The server is the sole authority for seeds and difficulty
//! - Difficulty is embedded in both seed and token and must match
//! - A seed is bound to the caller's IP and can be redeemed once
//! - Redeeming consumes the seed before the proof is checked

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::authorizer::Authorizer;
pub use application::config::PowConfig;
pub use application::difficulty::{DifficultyController, DifficultyHandle, NoOpDifficulty};
pub use application::request_quote::RequestQuoteUseCase;
pub use error::{ClientError, PowError, PowResult};
pub use infra::memory::MemorySeedRepository;
pub use infra::postgres::PgSeedRepository;
pub use infra::quotes::StaticQuotes;
pub use presentation::client::{ClientConfig, PowClient};
pub use presentation::connection::ConnectionConfig;
pub use presentation::listener::{Listener, ListenerConfig};
pub use presentation::router::{PowRouter, RequestHandler, pow_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod store {
    pub use crate::domain::repository::SeedRepository;
    pub use crate::infra::memory::MemorySeedRepository as MemoryStore;
    pub use crate::infra::postgres::PgSeedRepository as PgStore;
}

#[cfg(test)]
mod tests;
