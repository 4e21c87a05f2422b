//! Chaotic slot store wrapper for fault injection testing
//!
//! Randomly fails operations so tests can check that a failed write surfaces
//! as an error and never leaves a half-written slot behind.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{Arc, Mutex};

use super::{Slot, SlotStore, StorageError};

/// Slot store wrapper that randomly injects failures.
///
/// Delegates to an underlying store but fails operations based on a
/// configured failure rate. A failed operation never reaches the inner store.
#[derive(Clone)]
pub struct ChaoticSlotStore<S: SlotStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaoticRng>>,
}

/// Linear congruential generator, so chaos runs are reproducible per seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: SlotStore> ChaoticSlotStore<S> {
    /// Wrap `inner` with a fixed seed.
    ///
    /// `failure_rate` is clamped to [0.0, 1.0].
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        Self {
            inner,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
        }
    }

    /// Underlying store (for checking state after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn inject(&self, op: &str) -> Result<(), StorageError> {
        let mut rng =
            self.rng.lock().map_err(|_| StorageError::Io("chaos rng mutex poisoned".to_string()))?;

        if rng.next() < self.failure_rate {
            return Err(StorageError::Io(format!("chaotic failure injection ({op})")));
        }
        Ok(())
    }
}

impl<S: SlotStore> SlotStore for ChaoticSlotStore<S> {
    fn put(&self, slot: Slot, bytes: &[u8]) -> Result<(), StorageError> {
        self.inject("put")?;
        self.inner.put(slot, bytes)
    }

    fn get(&self, slot: Slot) -> Result<Option<Vec<u8>>, StorageError> {
        self.inject("get")?;
        self.inner.get(slot)
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        self.inject("remove")?;
        self.inner.remove(slot)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inject("clear")?;
        self.inner.clear()
    }
}
