//! Authorizer
//!
//! Mints and checks hashcash tokens and carries difficulty config in and out
//! of seeds and tokens.

use crate::application::config::PowConfig;
use crate::domain::repository::DifficultyManager;
use crate::domain::services::{check_stamp, mint_stamp};
use crate::domain::value_objects::{AuthorizerConfig, BitsRange, ConfigParseError};
use crate::error::PowResult;
use chrono::Utc;
use platform::crypto::CryptoError;

/// Hashcash authorizer over a difficulty source
#[derive(Debug, Clone)]
pub struct Authorizer<D> {
    difficulty: D,
    bits: BitsRange,
    salt_len: usize,
}

impl<D> Authorizer<D>
where
    D: DifficultyManager,
{
    pub fn new(difficulty: D, config: &PowConfig) -> Self {
        Self {
            difficulty,
            bits: config.bits,
            salt_len: config.salt_len,
        }
    }

    /// Mint a token over `seed` at the difficulty of `cfg`
    ///
    /// Blocks the calling thread for the whole search.
    pub fn generate_token(&self, seed: &str, cfg: &AuthorizerConfig) -> Result<String, CryptoError> {
        let bits = self.calculate_bits_len(cfg);
        let stamp = mint_stamp(seed, bits, self.salt_len, Utc::now())?;
        Ok(self.merge_with_config(&stamp, cfg))
    }

    /// Verify a bare stamp at the difficulty of `cfg`
    ///
    /// Every call counts as one request toward the observed load.
    pub fn check(&self, stamp: &str, cfg: &AuthorizerConfig) -> bool {
        self.difficulty.record_request();
        check_stamp(stamp, self.calculate_bits_len(cfg))
    }

    /// Current difficulty as a config
    pub async fn generate_config(&self) -> PowResult<AuthorizerConfig> {
        let percent = self.difficulty.current_difficulty_percent().await?;
        Ok(AuthorizerConfig::new(percent))
    }

    pub fn merge_with_config(&self, data: &str, cfg: &AuthorizerConfig) -> String {
        cfg.merge(data)
    }

    pub fn parse_config_from<'a>(
        &self,
        data_with_config: &'a str,
    ) -> Result<(&'a str, AuthorizerConfig), ConfigParseError> {
        AuthorizerConfig::parse(data_with_config)
    }

    pub fn calculate_bits_len(&self, cfg: &AuthorizerConfig) -> u32 {
        self.bits.bits_for(cfg)
    }
}
