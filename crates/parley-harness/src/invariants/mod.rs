//! Invariant checking for mirror state.
//!
//! Invariants are properties of the mirror that must hold after every event,
//! whatever order events arrive in. Tests take a [`MirrorSnapshot`] of the
//! mirror and run registered [`Invariant`] checks against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = MirrorSnapshot::from_mirror(engine.mirror());
//! registry.assert_all(&snapshot, "after sign-in");
//! ```

mod checks;
mod snapshot;

pub use checks::{
    ActiveChannelListed, ChannelHasHistory, HistoryInChannel, NoDuplicateMessages,
    SessionConsistency,
};
pub use snapshot::MirrorSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property checked against a mirror snapshot.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against `state`.
    fn check(&self, state: &MirrorSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// Create a registry with every mirror invariant.
    ///
    /// Includes:
    /// - [`SessionConsistency`]: no session means nothing is mirrored
    /// - [`ChannelHasHistory`]: every listed channel has a history entry
    /// - [`ActiveChannelListed`]: the active channel is in the channel list
    /// - [`NoDuplicateMessages`]: message IDs are unique per channel
    /// - [`HistoryInChannel`]: messages sit under their own channel
    pub fn standard() -> Self {
        Self {
            invariants: vec![
                Box::new(SessionConsistency),
                Box::new(ChannelHasHistory),
                Box::new(ActiveChannelListed),
                Box::new(NoDuplicateMessages),
                Box::new(HistoryInChannel),
            ],
        }
    }

    /// Check all invariants. Returns every violation found.
    pub fn check_all(&self, state: &MirrorSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    #[allow(clippy::panic, reason = "Test assertion helper")]
    pub fn assert_all(&self, state: &MirrorSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }
}
