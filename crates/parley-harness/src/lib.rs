//! Test harness for the Parley mirror engine.
//!
//! In-process stand-ins for the engine's collaborators, so engine flows run
//! without a chat server:
//!
//! - [`FakeRemote`]: scripted chat service implementing
//!   [`parley_remote::RemoteClient`], with call counters and failure injection
//! - [`ScriptedPush`]: push source whose frames are fed by the test through a
//!   [`PushHandle`]
//! - [`fixtures`]: users, channels, messages and signed session tokens
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties of a [`parley_app::Mirror`] that
//! must hold after every event. Use [`InvariantRegistry::standard()`] for the
//! full set.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod fixtures;
pub mod invariants;
mod push;
mod remote;

pub use invariants::{
    ActiveChannelListed, ChannelHasHistory, HistoryInChannel, Invariant, InvariantRegistry,
    InvariantResult, MirrorSnapshot, NoDuplicateMessages, SessionConsistency, Violation,
};
pub use push::{PushHandle, ScriptedPush};
pub use remote::{Call, FakeRemote};
