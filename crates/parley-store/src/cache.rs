//! Typed persist/restore over a [`SlotStore`].

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{Slot, SlotStore, StorageError};

/// Typed, write-through cache of mirror slots.
///
/// Values are CBOR-encoded. Restoring never fails as a whole: a slot that is
/// missing, unreadable or undecodable comes back as `None` and is logged.
#[derive(Clone)]
pub struct DurableCache<S: SlotStore> {
    store: S,
}

impl<S: SlotStore> DurableCache<S> {
    /// Wrap a slot store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying slot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encode `value` and write it to `slot`.
    pub fn persist<T: Serialize>(&self, slot: Slot, value: &T) -> Result<(), StorageError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.store.put(slot, &bytes)?;
        debug!(%slot, bytes = bytes.len(), "persisted slot");
        Ok(())
    }

    /// Persist `Some(value)`, or empty the slot for `None`.
    pub fn persist_optional<T: Serialize>(
        &self,
        slot: Slot,
        value: Option<&T>,
    ) -> Result<(), StorageError> {
        match value {
            Some(value) => self.persist(slot, value),
            None => {
                self.store.remove(slot)?;
                debug!(%slot, "cleared slot");
                Ok(())
            },
        }
    }

    /// Read and decode `slot`.
    pub fn restore<T: DeserializeOwned>(&self, slot: Slot) -> Option<T> {
        let bytes = match self.store.get(slot) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(%slot, error = %e, "slot unreadable, treating as absent");
                return None;
            },
        };

        match ciborium::de::from_reader(bytes.as_slice()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%slot, error = %e, "slot corrupt, treating as absent");
                None
            },
        }
    }

    /// Empty every slot.
    pub fn erase_all(&self) -> Result<(), StorageError> {
        self.store.clear()?;
        debug!("erased all slots");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::MemorySlotStore;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u64,
        name: String,
    }

    fn cache() -> DurableCache<MemorySlotStore> {
        DurableCache::new(MemorySlotStore::new())
    }

    #[test]
    fn restore_returns_persisted_value() {
        let cache = cache();
        let ada = Profile { id: 42, name: "Ada".into() };

        cache.persist(Slot::User, &ada).unwrap();
        assert_eq!(cache.restore::<Profile>(Slot::User), Some(ada));
    }

    #[test]
    fn corrupt_slot_does_not_affect_others() {
        let cache = cache();
        cache.persist(Slot::User, &Profile { id: 1, name: "a".into() }).unwrap();
        cache.persist(Slot::Token, &"tok".to_string()).unwrap();

        cache.store().tamper(Slot::User, &[0xff, 0x00, 0x13]).unwrap();

        assert_eq!(cache.restore::<Profile>(Slot::User), None);
        assert_eq!(cache.restore::<String>(Slot::Token), Some("tok".to_string()));
    }

    #[test]
    fn wrong_shape_restores_as_absent() {
        let cache = cache();
        cache.persist(Slot::Workspace, &vec![1u8, 2, 3]).unwrap();
        assert_eq!(cache.restore::<Profile>(Slot::Workspace), None);
    }

    #[test]
    fn persist_none_clears_slot() {
        let cache = cache();
        cache.persist(Slot::Token, &"tok".to_string()).unwrap();
        cache.persist_optional::<String>(Slot::Token, None).unwrap();

        assert_eq!(cache.restore::<String>(Slot::Token), None);
    }

    #[test]
    fn erase_all_empties_every_slot() {
        let cache = cache();
        for slot in Slot::ALL {
            cache.persist(slot, &slot.name().to_string()).unwrap();
        }

        cache.erase_all().unwrap();

        for slot in Slot::ALL {
            assert_eq!(cache.restore::<String>(slot), None);
        }
    }
}
