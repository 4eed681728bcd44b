//! Seed Generator

use chrono::{DateTime, Utc};
use platform::client::ClientIdentity;
use platform::crypto::{CryptoError, to_base64, try_random_bytes};

/// Builds unique, client-bound seeds
///
/// Seed layout before encoding: `<identity>-<unix nanos>-<base64(random)>`.
/// The whole string is base64-encoded again, so the random part ends up
/// encoded twice.
#[derive(Debug, Clone, Copy)]
pub struct SeedGenerator {
    random_len: usize,
}

impl SeedGenerator {
    pub fn new(random_len: usize) -> Self {
        Self { random_len }
    }

    pub fn generate(
        &self,
        identity: &ClientIdentity,
        request_time: DateTime<Utc>,
    ) -> Result<String, CryptoError> {
        let random = to_base64(&try_random_bytes(self.random_len)?);
        let nanos = request_time.timestamp_nanos_opt().unwrap_or_default();
        Ok(to_base64(format!("{identity}-{nanos}-{random}").as_bytes()))
    }
}
