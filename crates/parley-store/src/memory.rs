#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::{Slot, SlotStore, StorageError};

/// In-memory slot store for testing and simulation.
///
/// All state is wrapped in `Arc<Mutex<>>` so clones share the same slots.
#[derive(Clone, Default)]
pub struct MemorySlotStore {
    inner: Arc<Mutex<HashMap<Slot, Vec<u8>>>>,
}

impl MemorySlotStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty slots.
    pub fn len(&self) -> usize {
        self.lock().map(|slots| slots.len()).unwrap_or_default()
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a slot with arbitrary bytes, bypassing encoding.
    ///
    /// Lets tests simulate a corrupted or foreign value.
    pub fn tamper(&self, slot: Slot, bytes: &[u8]) -> Result<(), StorageError> {
        self.put(slot, bytes)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Slot, Vec<u8>>>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("slot map mutex poisoned".to_string()))
    }
}

impl SlotStore for MemorySlotStore {
    fn put(&self, slot: Slot, bytes: &[u8]) -> Result<(), StorageError> {
        self.lock()?.insert(slot, bytes.to_vec());
        Ok(())
    }

    fn get(&self, slot: Slot) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock()?.get(&slot).cloned())
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        self.lock()?.remove(&slot);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock()?.clear();
        Ok(())
    }
}
