//! Workspace, channel list and user directory.
//!
//! The channel list keeps server fetch order; channels added later are
//! appended. The directory is replaced wholesale on every pull.

use std::collections::BTreeMap;

use parley_core::{Channel, ChannelId, User, UserId, Workspace};

use crate::DirectChannel;

/// Workspace, channels and users of the current session.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    workspace: Option<Workspace>,
    channels: Vec<Channel>,
    users: BTreeMap<UserId, User>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspace of the signed-in user.
    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// Set or clear the workspace.
    pub fn set_workspace(&mut self, workspace: Option<Workspace>) {
        self.workspace = workspace;
    }

    /// Channels in list order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel by ID.
    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Whether `id` is in the channel list.
    pub fn has_channel(&self, id: ChannelId) -> bool {
        self.channel(id).is_some()
    }

    /// Replace the channel list, keeping the first of any repeated IDs.
    pub fn replace_channels(&mut self, channels: Vec<Channel>) {
        self.channels.clear();
        for channel in channels {
            if !self.has_channel(channel.id) {
                self.channels.push(channel);
            }
        }
    }

    /// Append `channel`, or replace it in place if its ID is already listed.
    ///
    /// Returns `true` if the channel was new.
    pub fn upsert_channel(&mut self, channel: Channel) -> bool {
        match self.channels.iter_mut().find(|c| c.id == channel.id) {
            Some(held) => {
                *held = channel;
                false
            },
            None => {
                self.channels.push(channel);
                true
            },
        }
    }

    /// Directory entries by user ID.
    pub fn users(&self) -> &BTreeMap<UserId, User> {
        &self.users
    }

    /// Directory entry for `id`.
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Replace the user directory.
    pub fn replace_users(&mut self, users: impl IntoIterator<Item = User>) {
        self.users = users.into_iter().map(|u| (u.id, u)).collect();
    }

    /// Channels that are not one-to-one, in list order.
    pub fn group_channels(&self) -> Vec<&Channel> {
        self.channels.iter().filter(|c| !c.kind.is_single()).collect()
    }

    /// One-to-one channels in list order, each with the other participant.
    pub fn direct_channels(&self, me: Option<UserId>) -> Vec<DirectChannel<'_>> {
        self.channels
            .iter()
            .filter(|c| c.kind.is_single())
            .map(|channel| DirectChannel {
                channel,
                recipient: channel.counterpart(me).and_then(|id| self.users.get(&id)),
            })
            .collect()
    }

    /// Drop workspace, channels and users.
    pub fn clear(&mut self) {
        self.workspace = None;
        self.channels.clear();
        self.users.clear();
    }

    /// Whether workspace, channels and users are all absent.
    pub fn is_empty(&self) -> bool {
        self.workspace.is_none() && self.channels.is_empty() && self.users.is_empty()
    }
}
