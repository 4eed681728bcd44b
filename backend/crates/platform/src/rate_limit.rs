//! Rate Measurement Infrastructure
//!
//! Two-bucket sliding window used to estimate the current request rate.
//! The previous bucket contributes proportionally to how much of it still
//! overlaps the trailing window.

use std::time::{Duration, Instant};

/// Request counter split into the current and the previous bucket
#[derive(Debug, Clone)]
pub struct RateWindow {
    current: u64,
    previous: u64,
    started_at: Instant,
    bucket: Duration,
}

impl RateWindow {
    /// Create a window whose previous bucket is pre-seeded
    ///
    /// Seeding the previous bucket lets the estimate start near the expected
    /// rate instead of at zero.
    pub fn new(previous: u64, bucket: Duration, now: Instant) -> Self {
        Self {
            current: 0,
            previous,
            started_at: now,
            bucket,
        }
    }

    /// Count one request in the current bucket
    pub fn record(&mut self) {
        self.current = self.current.saturating_add(1);
    }

    /// Close the current bucket and open a fresh one at `now`
    pub fn roll_over(&mut self, now: Instant) {
        self.previous = self.current;
        self.current = 0;
        self.started_at = now;
    }

    /// Blended requests per second as observed at `now`
    pub fn rps(&self, now: Instant) -> f64 {
        calculate_rps(
            self.current,
            self.previous,
            now.saturating_duration_since(self.started_at),
            self.bucket,
        )
    }

    pub fn bucket(&self) -> Duration {
        self.bucket
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn previous(&self) -> u64 {
        self.previous
    }
}

/// Blend the two buckets into a per-second rate
///
/// `elapsed` is clamped to `bucket`; once a full bucket has passed the
/// previous bucket no longer contributes.
pub fn calculate_rps(current: u64, previous: u64, elapsed: Duration, bucket: Duration) -> f64 {
    let bucket_nanos = bucket.as_nanos() as f64;
    if bucket_nanos == 0.0 {
        return 0.0;
    }
    let elapsed = elapsed.min(bucket);
    let fraction_remaining = (bucket_nanos - elapsed.as_nanos() as f64) / bucket_nanos;
    let total = current as f64 + previous as f64 * fraction_remaining;
    total / bucket.as_secs_f64()
}
