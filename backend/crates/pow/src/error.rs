//! PoW Error Types
//!
//! This module provides PoW-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use crate::domain::value_objects::ConfigParseError;
use crate::presentation::codec::ProtocolError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::crypto::CryptoError;
use thiserror::Error;

/// PoW-specific result type alias
pub type PowResult<T> = Result<T, PowError>;

/// Server-side request failures
///
/// Every variant is reported to the client as an `error` frame carrying the
/// display text; none of them closes the connection.
#[derive(Debug, Error)]
pub enum PowError {
    /// No matching seed in the replay store (never issued, expired, or used)
    #[error("user did not request an auth")]
    AuthNotRequested,

    /// Token was minted at a different difficulty than the seed carries
    #[error("token difficulty does not match the issued seed")]
    DifficultyMismatch,

    /// Token was minted over a different seed
    #[error("token was not minted for this seed")]
    SeedMismatch,

    /// Stamp is malformed or its digest is not hard enough
    #[error("user provided invalid auth token")]
    InvalidProof,

    #[error("parsing config from token: {0}")]
    InvalidToken(#[source] ConfigParseError),

    #[error("parsing config from seed: {0}")]
    InvalidSeed(#[source] ConfigParseError),

    #[error("expected {expected} payload fields, got {got}")]
    InvalidPayload { expected: usize, got: usize },

    #[error("unsupported request type: {0}")]
    UnsupportedRequestType(String),

    /// Replay store read or write failed
    #[error("seed storage unavailable: {0}")]
    StorageUnavailable(String),

    /// OS entropy source failed while generating a seed
    #[error("generating seed: {0}")]
    Entropy(#[from] CryptoError),

    /// The difficulty controller has been stopped
    #[error("difficulty controller is not running")]
    DifficultyUnavailable,
}

impl PowError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PowError::AuthNotRequested
            | PowError::DifficultyMismatch
            | PowError::SeedMismatch
            | PowError::InvalidProof
            | PowError::InvalidToken(_)
            | PowError::InvalidSeed(_) => ErrorKind::Authorization,
            PowError::InvalidPayload { .. } | PowError::UnsupportedRequestType(_) => {
                ErrorKind::Protocol
            }
            PowError::StorageUnavailable(_) => ErrorKind::Storage,
            PowError::Entropy(_) | PowError::DifficultyUnavailable => ErrorKind::Internal,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            PowError::StorageUnavailable(msg) => {
                tracing::error!(message = %msg, "PoW storage error");
            }
            PowError::Entropy(e) => {
                tracing::error!(error = %e, "PoW entropy failure");
            }
            PowError::DifficultyUnavailable => {
                tracing::error!(error = %self, "PoW internal error");
            }
            PowError::InvalidProof | PowError::DifficultyMismatch | PowError::SeedMismatch => {
                tracing::warn!(error = %self, "PoW verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "PoW error");
            }
        }
    }
}

impl From<sqlx::Error> for PowError {
    fn from(err: sqlx::Error) -> Self {
        PowError::StorageUnavailable(err.to_string())
    }
}

impl From<PowError> for AppError {
    fn from(err: PowError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        AppError::new(kind, message).with_source(err)
    }
}

/// Client-side failures while requesting a quote
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("dial timed out")]
    ConnectTimeout,

    #[error("request timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed before a response arrived")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server answered with an `error` frame
    #[error("server error: {0}")]
    Server(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid seed from server: {0}")]
    InvalidSeed(#[from] ConfigParseError),

    #[error("minting token: {0}")]
    Mint(#[from] CryptoError),

    #[error("minting task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(PowError::AuthNotRequested.kind(), ErrorKind::Authorization);
        assert_eq!(
            PowError::InvalidPayload { expected: 2, got: 1 }.kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            PowError::StorageUnavailable("down".into()).kind(),
            ErrorKind::Storage
        );
        assert_eq!(PowError::DifficultyUnavailable.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_into_app_error_keeps_message() {
        let app: AppError = PowError::InvalidPayload { expected: 2, got: 3 }.into();
        assert_eq!(app.kind(), ErrorKind::Protocol);
        assert_eq!(app.message(), "expected 2 payload fields, got 3");
    }
}
