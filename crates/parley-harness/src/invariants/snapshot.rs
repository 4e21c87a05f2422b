//! Observable mirror state.

use std::collections::BTreeMap;

use parley_app::Mirror;
use parley_core::{ChannelId, MessageId};

/// Snapshot of a mirror's observable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorSnapshot {
    /// Whether a session is established.
    pub authenticated: bool,
    /// Whether a workspace is held.
    pub has_workspace: bool,
    /// Listed channel IDs, in list order.
    pub channels: Vec<ChannelId>,
    /// Number of directory entries.
    pub users: usize,
    /// Per-channel history as `(message id, message channel id)` pairs.
    pub history: BTreeMap<ChannelId, Vec<(MessageId, ChannelId)>>,
    /// Active channel.
    pub active_channel: Option<ChannelId>,
}

impl MirrorSnapshot {
    /// Capture `mirror`.
    pub fn from_mirror(mirror: &Mirror) -> Self {
        let store = mirror.message_store();
        let history = store
            .channel_ids()
            .map(|id| (id, store.get(id).iter().map(|m| (m.id, m.channel_id)).collect()))
            .collect();

        Self {
            authenticated: mirror.is_authenticated(),
            has_workspace: mirror.workspace().is_some(),
            channels: mirror.channels().iter().map(|c| c.id).collect(),
            users: mirror.directory().users().len(),
            history,
            active_channel: mirror.active_channel_id(),
        }
    }

    /// Whether nothing besides the session flag is held.
    pub fn is_bare(&self) -> bool {
        !self.has_workspace
            && self.channels.is_empty()
            && self.users == 0
            && self.history.is_empty()
            && self.active_channel.is_none()
    }
}
