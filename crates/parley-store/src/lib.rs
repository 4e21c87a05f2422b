//! Durable slot cache for the Parley mirror engine.
//!
//! The mirror persists a handful of named slots (session user, token,
//! workspace, channel list, user directory) so a restarted client can show
//! state before it touches the network. Each slot is an independent CBOR blob:
//! a slot that fails to decode is reported as absent and never affects the
//! others.
//!
//! # Backends
//!
//! - [`MemorySlotStore`]: in-process map for tests and simulation
//! - [`RedbSlotStore`]: durable, ACID, one `slots` table
//! - [`ChaoticSlotStore`]: wraps another backend and injects failures
//!
//! [`DurableCache`] layers typed `persist`/`restore` over any backend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod chaotic;
mod error;
mod memory;
mod redb;
mod slot;

pub use cache::DurableCache;
pub use chaotic::ChaoticSlotStore;
pub use error::StorageError;
pub use memory::MemorySlotStore;
pub use slot::Slot;

pub use self::redb::RedbSlotStore;

/// Raw byte storage keyed by [`Slot`].
///
/// Must be Clone (the engine and tests may hold handles to the same store),
/// Send + Sync, and synchronous. Implementations share internal state via
/// Arc, so clones see the same slots.
pub trait SlotStore: Clone + Send + Sync + 'static {
    /// Write `bytes` to `slot`, replacing any previous value.
    fn put(&self, slot: Slot, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read the bytes held in `slot`. `None` if the slot is empty.
    fn get(&self, slot: Slot) -> Result<Option<Vec<u8>>, StorageError>;

    /// Empty `slot`. Removing an empty slot is not an error.
    fn remove(&self, slot: Slot) -> Result<(), StorageError>;

    /// Empty every slot in one step.
    fn clear(&self) -> Result<(), StorageError>;
}
