//! Mirror side-effects.
//!
//! This module defines the [`MirrorAction`] enum, instructions produced by
//! the [`crate::Mirror`] state machine for the engine to execute before the
//! triggering intent returns.

use parley_store::Slot;

/// Actions produced by the Mirror state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAction {
    /// Write the current value of a slot to the durable cache. An absent
    /// value empties the slot.
    Persist(Slot),

    /// Tear down the live connection.
    CloseLive,

    /// Empty every durable slot.
    EraseAll,
}
