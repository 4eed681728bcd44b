//! Client configuration from environment variables

use anyhow::{Context, bail};
use pow::domain::services::MAX_STAMP_BITS;
use pow::domain::value_objects::BitsRange;
use pow::{ClientConfig, PowConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct QuoteClientConfig {
    pub network_address: String,
    /// Must match the server's range or minted tokens are rejected
    pub pow: PowConfig,
    pub client: ClientConfig,
    pub request_count: usize,
}

impl QuoteClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let network_address =
            dial_address(get("NETWORK_ADDRESS").context("NETWORK_ADDRESS must be set")?);

        let bits_min = parse_or(get("BITS_LEN_MIN"), "BITS_LEN_MIN", BitsRange::DEFAULT_MIN)?;
        let bits_max = parse_or(get("BITS_LEN_MAX"), "BITS_LEN_MAX", BitsRange::DEFAULT_MAX)?;
        if bits_min > bits_max {
            bail!("BITS_LEN_MIN ({bits_min}) must not exceed BITS_LEN_MAX ({bits_max})");
        }
        if bits_max > MAX_STAMP_BITS {
            bail!("BITS_LEN_MAX ({bits_max}) must not exceed {MAX_STAMP_BITS}");
        }
        let timeout_ms: u64 =
            parse_or(get("CONNECTION_TIMEOUT_MS"), "CONNECTION_TIMEOUT_MS", 500)?;
        let request_count = parse_or(get("REQUEST_COUNT"), "REQUEST_COUNT", 3)?;

        Ok(Self {
            network_address,
            pow: PowConfig {
                bits: BitsRange::new(bits_min, bits_max),
                ..Default::default()
            },
            client: ClientConfig {
                connection_timeout: Duration::from_millis(timeout_ms),
                ..Default::default()
            },
            request_count,
        })
    }
}

/// `:8080` dials the local host
fn dial_address(raw: String) -> String {
    if raw.starts_with(':') {
        format!("127.0.0.1{raw}")
    } else {
        raw
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            QuoteClientConfig::from_lookup(lookup(&[("NETWORK_ADDRESS", ":8080")])).unwrap();

        assert_eq!(config.network_address, "127.0.0.1:8080");
        assert_eq!(config.pow.bits, BitsRange::new(10, 26));
        assert_eq!(config.client.dial_timeout, Duration::from_millis(100));
        assert_eq!(config.client.connection_timeout, Duration::from_millis(500));
        assert_eq!(config.request_count, 3);
    }

    #[test]
    fn test_overrides() {
        let config = QuoteClientConfig::from_lookup(lookup(&[
            ("NETWORK_ADDRESS", "quotes.internal:9000"),
            ("BITS_LEN_MIN", "2"),
            ("BITS_LEN_MAX", "8"),
            ("CONNECTION_TIMEOUT_MS", "2000"),
            ("REQUEST_COUNT", "10"),
        ]))
        .unwrap();

        assert_eq!(config.network_address, "quotes.internal:9000");
        assert_eq!(config.pow.bits, BitsRange::new(2, 8));
        assert_eq!(config.client.connection_timeout, Duration::from_secs(2));
        assert_eq!(config.request_count, 10);
    }

    #[test]
    fn test_missing_address() {
        assert!(QuoteClientConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("REQUEST_COUNT", "-1"),
            ("BITS_LEN_MAX", "lots"),
            ("BITS_LEN_MAX", "257"),
            ("CONNECTION_TIMEOUT_MS", "1.5"),
        ] {
            let result = QuoteClientConfig::from_lookup(lookup(&[
                ("NETWORK_ADDRESS", ":8080"),
                (key, value),
            ]));
            assert!(result.is_err(), "{key}={value}");
        }
    }
}
