//! Redb-backed durable slot store.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Slots
//! survive process restarts.

use std::{path::Path, sync::Arc};

use redb::{Database, ReadableTable, TableDefinition};

use super::{Slot, SlotStore, StorageError};

/// Table: slots
/// Key: slot name
/// Value: CBOR-encoded slot value
const SLOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("slots");

/// Durable slot store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbSlotStore {
    db: Arc<Database>,
}

impl RedbSlotStore {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the `slots` table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(SLOTS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl SlotStore for RedbSlotStore {
    fn put(&self, slot: Slot, bytes: &[u8]) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table = txn.open_table(SLOTS).map_err(|e| StorageError::Io(e.to_string()))?;
            table.insert(slot.name(), bytes).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))
    }

    fn get(&self, slot: Slot) -> Result<Option<Vec<u8>>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(SLOTS).map_err(|e| StorageError::Io(e.to_string()))?;

        let value = table.get(slot.name()).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table = txn.open_table(SLOTS).map_err(|e| StorageError::Io(e.to_string()))?;
            table.remove(slot.name()).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))
    }

    fn clear(&self) -> Result<(), StorageError> {
        // All slots go in one transaction: a crash leaves either every slot or none.
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table = txn.open_table(SLOTS).map_err(|e| StorageError::Io(e.to_string()))?;
            for slot in Slot::ALL {
                table.remove(slot.name()).map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))
    }
}
