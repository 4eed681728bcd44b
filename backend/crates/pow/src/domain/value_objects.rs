//! Domain Value Objects
//!
//! Immutable value types for the PoW domain.

use std::num::ParseIntError;

/// Version tag of the difficulty envelope
pub const CONFIG_VERSION_V1: &str = "v1";

const CONFIG_SEPARATOR: char = ';';

/// Difficulty parameters carried alongside a seed or token
///
/// The percent is stored as received. It is only clamped to `0..=100` when
/// mapped to a bit length, so a client cannot shift the level by sending an
/// out-of-range value that happens to clamp to the same bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthorizerConfig {
    pub difficulty_level_percent: i32,
}

impl AuthorizerConfig {
    pub fn new(difficulty_level_percent: i32) -> Self {
        Self {
            difficulty_level_percent,
        }
    }

    pub fn clamped_percent(&self) -> i32 {
        self.difficulty_level_percent.clamp(0, 100)
    }

    /// Prefix `data` with this config: `v1;<percent>;<data>`
    pub fn merge(&self, data: &str) -> String {
        format!(
            "{CONFIG_VERSION_V1}{CONFIG_SEPARATOR}{}{CONFIG_SEPARATOR}{data}",
            self.difficulty_level_percent
        )
    }

    /// Split a merged string back into its payload and config
    ///
    /// The payload is everything after the second separator and may itself
    /// contain `;`.
    pub fn parse(merged: &str) -> Result<(&str, Self), ConfigParseError> {
        let chunks: Vec<&str> = merged.splitn(3, CONFIG_SEPARATOR).collect();
        let [version, percent, data] = chunks[..] else {
            return Err(ConfigParseError::WrongPartCount(chunks.len()));
        };
        if version != CONFIG_VERSION_V1 {
            return Err(ConfigParseError::UnsupportedVersion(version.to_owned()));
        }
        let level = percent.parse::<i32>()?;
        Ok((data, Self::new(level)))
    }
}

/// Failure to read a difficulty envelope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigParseError {
    #[error("got {0} chunks in data with config instead of 3")]
    WrongPartCount(usize),

    #[error("config version {0} is not supported")]
    UnsupportedVersion(String),

    #[error("parsing difficulty level percent: {0}")]
    InvalidPercent(#[from] ParseIntError),
}

/// Inclusive range of stamp bit lengths the difficulty percent maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitsRange {
    pub min: u32,
    pub max: u32,
}

impl BitsRange {
    pub const DEFAULT_MIN: u32 = 10;
    pub const DEFAULT_MAX: u32 = 26;

    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Linear map of the clamped percent into `min..=max` (floored)
    pub fn bits_for(&self, config: &AuthorizerConfig) -> u32 {
        let level = config.clamped_percent() as u32;
        self.min + self.max.saturating_sub(self.min) * level / 100
    }
}

impl Default for BitsRange {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN, Self::DEFAULT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_format() {
        assert_eq!(AuthorizerConfig::new(15).merge("data"), "v1;15;data");
        assert_eq!(AuthorizerConfig::new(-4).merge(""), "v1;-4;");
    }

    #[test]
    fn test_parse_valid() {
        let (data, cfg) = AuthorizerConfig::parse("v1;15;data").unwrap();
        assert_eq!(data, "data");
        assert_eq!(cfg, AuthorizerConfig::new(15));
    }

    #[test]
    fn test_parse_keeps_separators_in_payload() {
        let (data, cfg) = AuthorizerConfig::parse("v1;7;a;b;c").unwrap();
        assert_eq!(data, "a;b;c");
        assert_eq!(cfg.difficulty_level_percent, 7);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            AuthorizerConfig::parse("15;data"),
            Err(ConfigParseError::WrongPartCount(2))
        );
        assert_eq!(
            AuthorizerConfig::parse("v2;15;data"),
            Err(ConfigParseError::UnsupportedVersion("v2".to_string()))
        );
        assert!(matches!(
            AuthorizerConfig::parse("v1;fifteen;data"),
            Err(ConfigParseError::InvalidPercent(_))
        ));
    }

    #[test]
    fn test_parse_after_merge() {
        for level in [-150, 0, 30, 100, 250] {
            let cfg = AuthorizerConfig::new(level);
            let merged = cfg.merge("payload;with;semicolons");
            let (data, parsed) = AuthorizerConfig::parse(&merged).unwrap();
            assert_eq!(data, "payload;with;semicolons");
            assert_eq!(parsed, cfg);
        }
    }

    #[test]
    fn test_bits_for_vectors() {
        assert_eq!(BitsRange::new(0, 100).bits_for(&AuthorizerConfig::new(5)), 5);
        assert_eq!(BitsRange::new(2, 10).bits_for(&AuthorizerConfig::new(150)), 10);
        assert_eq!(BitsRange::new(2, 10).bits_for(&AuthorizerConfig::new(-150)), 2);
        assert_eq!(BitsRange::new(20, 105).bits_for(&AuthorizerConfig::new(15)), 32);
    }

    #[test]
    fn test_bits_for_clamped_and_monotone() {
        let range = BitsRange::default();
        let mut previous = range.min;
        for level in -1000..=1000 {
            let bits = range.bits_for(&AuthorizerConfig::new(level));
            assert!((range.min..=range.max).contains(&bits));
            assert!(bits >= previous);
            previous = bits;
        }
    }
}
