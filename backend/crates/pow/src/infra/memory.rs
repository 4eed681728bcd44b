//! In-process Repository Implementations

use crate::domain::entities::IssuedSeed;
use crate::domain::repository::SeedRepository;
use crate::error::{PowError, PowResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Slot {
    seed: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct Slots {
    by_identity: HashMap<String, Slot>,
    next_sweep: Instant,
}

/// Replay store kept in process memory
///
/// One slot per identity: storing a new seed replaces the outstanding one.
/// Expired slots are swept on a store once `sweep_interval` has passed since
/// the previous sweep.
#[derive(Debug)]
pub struct MemorySeedRepository {
    slots: Mutex<Slots>,
    sweep_interval: Duration,
}

impl Default for MemorySeedRepository {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemorySeedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            slots: Mutex::new(Slots {
                by_identity: HashMap::new(),
                next_sweep: Instant::now() + sweep_interval,
            }),
            sweep_interval,
        }
    }

    /// Number of live and not yet swept slots
    pub fn len(&self) -> PowResult<usize> {
        Ok(self.lock()?.by_identity.len())
    }

    pub fn is_empty(&self) -> PowResult<bool> {
        Ok(self.lock()?.by_identity.is_empty())
    }

    fn lock(&self) -> PowResult<MutexGuard<'_, Slots>> {
        self.slots
            .lock()
            .map_err(|_| PowError::StorageUnavailable("seed store lock poisoned".to_string()))
    }
}

impl SeedRepository for MemorySeedRepository {
    async fn store(&self, seed: &IssuedSeed, ttl: Duration) -> PowResult<()> {
        let now = Instant::now();
        let mut slots = self.lock()?;
        if now >= slots.next_sweep {
            slots.by_identity.retain(|_, slot| slot.expires_at > now);
            slots.next_sweep = now + self.sweep_interval;
        }
        slots.by_identity.insert(
            seed.identity.clone(),
            Slot {
                seed: seed.seed.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn exists(&self, seed: &IssuedSeed) -> PowResult<bool> {
        let now = Instant::now();
        let slots = self.lock()?;
        Ok(slots
            .by_identity
            .get(&seed.identity)
            .is_some_and(|slot| slot.seed == seed.seed && slot.expires_at > now))
    }

    /// Clears the identity's slot only while it still holds this seed
    async fn delete(&self, seed: &IssuedSeed) -> PowResult<()> {
        let mut slots = self.lock()?;
        if slots
            .by_identity
            .get(&seed.identity)
            .is_some_and(|slot| slot.seed == seed.seed)
        {
            slots.by_identity.remove(&seed.identity);
        }
        Ok(())
    }
}
