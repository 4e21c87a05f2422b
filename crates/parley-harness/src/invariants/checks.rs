//! Standard mirror invariants.

use std::collections::HashSet;

use super::{Invariant, InvariantResult, MirrorSnapshot, Violation};

/// Without a session nothing is mirrored.
///
/// Sign-out and a failed restore must leave no workspace, channels, users,
/// history or active channel behind.
pub struct SessionConsistency;

impl Invariant for SessionConsistency {
    fn name(&self) -> &'static str {
        "session_consistency"
    }

    fn check(&self, state: &MirrorSnapshot) -> InvariantResult {
        if state.authenticated || state.is_bare() {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!(
                "signed out but holding {} channels, {} users, {} histories",
                state.channels.len(),
                state.users,
                state.history.len()
            ),
        })
    }
}

/// Every listed channel has a history entry, possibly empty.
pub struct ChannelHasHistory;

impl Invariant for ChannelHasHistory {
    fn name(&self) -> &'static str {
        "channel_has_history"
    }

    fn check(&self, state: &MirrorSnapshot) -> InvariantResult {
        match state.channels.iter().find(|id| !state.history.contains_key(id)) {
            Some(id) => Err(Violation {
                invariant: self.name(),
                message: format!("channel {id} is listed without a history entry"),
            }),
            None => Ok(()),
        }
    }
}

/// The active channel, if any, is in the channel list.
pub struct ActiveChannelListed;

impl Invariant for ActiveChannelListed {
    fn name(&self) -> &'static str {
        "active_channel_listed"
    }

    fn check(&self, state: &MirrorSnapshot) -> InvariantResult {
        match state.active_channel {
            Some(active) if !state.channels.contains(&active) => Err(Violation {
                invariant: self.name(),
                message: format!("active channel {active} not in {:?}", state.channels),
            }),
            _ => Ok(()),
        }
    }
}

/// A message ID appears at most once in a channel's history.
///
/// Local sends and their push echoes must collapse into one entry.
pub struct NoDuplicateMessages;

impl Invariant for NoDuplicateMessages {
    fn name(&self) -> &'static str {
        "no_duplicate_messages"
    }

    fn check(&self, state: &MirrorSnapshot) -> InvariantResult {
        for (channel_id, messages) in &state.history {
            let mut seen = HashSet::new();
            if let Some((id, _)) = messages.iter().find(|(id, _)| !seen.insert(*id)) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("channel {channel_id}: message {id} appears twice"),
                });
            }
        }
        Ok(())
    }
}

/// Messages are filed under the channel they belong to.
pub struct HistoryInChannel;

impl Invariant for HistoryInChannel {
    fn name(&self) -> &'static str {
        "history_in_channel"
    }

    fn check(&self, state: &MirrorSnapshot) -> InvariantResult {
        for (channel_id, messages) in &state.history {
            if let Some((id, owner)) = messages.iter().find(|(_, owner)| owner != channel_id) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("message {id} of channel {owner} filed under {channel_id}"),
                });
            }
        }
        Ok(())
    }
}
