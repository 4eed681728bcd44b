//! Server configuration from environment variables

use anyhow::{Context, bail};
use pow::domain::services::MAX_STAMP_BITS;
use pow::domain::value_objects::BitsRange;
use pow::{ConnectionConfig, ListenerConfig, PowConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub network_address: String,
    /// Unset means the in-memory replay store
    pub database_url: Option<String>,
    pub pow: PowConfig,
    pub listener: ListenerConfig,
}

impl ServerConfig {
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
            listen_address(get("NETWORK_ADDRESS").context("NETWORK_ADDRESS must be set")?);
        let target_rps: f64 = parse(
            get("TARGET_RPS").context("TARGET_RPS must be set")?,
            "TARGET_RPS",
        )?;
        if !target_rps.is_finite() || target_rps <= 0.0 {
            bail!("TARGET_RPS must be a positive number, got {target_rps}");
        }

        let defaults = PowConfig::default();
        let difficulty_step =
            parse_or(get("DIFFICULTY_STEP"), "DIFFICULTY_STEP", defaults.difficulty_step)?;
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

        Ok(Self {
            network_address,
            database_url: get("DATABASE_URL"),
            pow: PowConfig {
                target_rps,
                difficulty_step,
                bits: BitsRange::new(bits_min, bits_max),
                ..defaults
            },
            listener: ListenerConfig {
                connection: ConnectionConfig {
                    max_lifetime: Duration::from_millis(timeout_ms),
                    ..Default::default()
                },
                ..Default::default()
            },
        })
    }
}

/// `:8080` listens on every interface
fn listen_address(raw: String) -> String {
    if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw
    }
}

fn parse<T>(raw: String, key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid {key}: {raw:?}"))
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map_or(Ok(default), |raw| parse(raw, key))
}
