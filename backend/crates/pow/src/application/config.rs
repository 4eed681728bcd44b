//! Application Configuration
//!
//! Configuration for the PoW application layer.

use crate::domain::value_objects::BitsRange;
use std::time::Duration;

/// PoW application configuration
#[derive(Debug, Clone)]
pub struct PowConfig {
    /// Random bytes mixed into every seed
    pub seed_random_len: usize,
    /// How long an issued seed stays redeemable
    pub seed_ttl: Duration,
    /// Stamp bit lengths the difficulty percent maps onto
    pub bits: BitsRange,
    /// Salt length of minted stamps
    pub salt_len: usize,
    /// Gated checks per second the controller steers toward
    pub target_rps: f64,
    /// Level change per difficulty query
    pub difficulty_step: i32,
    /// Level before any traffic has been observed
    pub initial_difficulty_percent: i32,
    /// Length of one rate-measurement bucket
    pub bucket: Duration,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            seed_random_len: 16,
            seed_ttl: Duration::from_secs(120),
            bits: BitsRange::default(),
            salt_len: 32,
            target_rps: 100.0,
            difficulty_step: 3,
            initial_difficulty_percent: 30,
            bucket: Duration::from_secs(5),
        }
    }
}

impl PowConfig {
    /// Requests assumed for the bucket before startup
    ///
    /// Starts the controller as if traffic were exactly on target.
    pub fn initial_previous_bucket(&self) -> u64 {
        // Float-to-int casts saturate, so negative or NaN targets give 0
        (self.bucket.as_secs_f64() * self.target_rps) as u64
    }
}
