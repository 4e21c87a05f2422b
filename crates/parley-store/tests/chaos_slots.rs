//! Chaos property tests for slot stores.
//!
//! Wrapping a backend in `ChaoticSlotStore` must never corrupt it:
//! - a successful persist is visible to restore
//! - a failed persist leaves the previous value in place
//! - slots stay independent of each other

use parley_store::{
    ChaoticSlotStore, DurableCache, MemorySlotStore, RedbSlotStore, Slot, SlotStore, StorageError,
};
use proptest::prelude::*;
use tempfile::tempdir;

fn slot_strategy() -> impl Strategy<Value = Slot> {
    prop::sample::select(Slot::ALL.to_vec())
}

#[test]
fn prop_failed_writes_keep_previous_value() {
    proptest!(|(
        failure_rate in 0.0..0.9,
        seed in any::<u64>(),
        writes in prop::collection::vec((slot_strategy(), any::<u32>()), 1..64),
    )| {
        let memory = MemorySlotStore::new();
        let cache = DurableCache::new(ChaoticSlotStore::with_seed(memory.clone(), failure_rate, seed));
        let clean = DurableCache::new(memory);

        let mut expected = std::collections::HashMap::new();
        for (slot, value) in writes {
            match cache.persist(slot, &value) {
                Ok(()) => {
                    expected.insert(slot, value);
                },
                Err(StorageError::Io(_)) => {},
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }

        for slot in Slot::ALL {
            prop_assert_eq!(clean.restore::<u32>(slot), expected.get(&slot).copied());
        }
    });
}

#[test]
fn prop_redb_matches_memory() {
    proptest!(ProptestConfig::with_cases(16), |(
        ops in prop::collection::vec((slot_strategy(), prop::option::of(any::<u64>())), 1..24),
    )| {
        let dir = tempdir().unwrap();
        let redb = DurableCache::new(RedbSlotStore::open(dir.path().join("m.redb")).unwrap());
        let memory = DurableCache::new(MemorySlotStore::new());

        for (slot, value) in &ops {
            redb.persist_optional(*slot, value.as_ref()).unwrap();
            memory.persist_optional(*slot, value.as_ref()).unwrap();
        }

        for slot in Slot::ALL {
            prop_assert_eq!(redb.restore::<u64>(slot), memory.restore::<u64>(slot));
        }
        prop_assert!(redb.store().get(Slot::User).is_ok());
    });
}
