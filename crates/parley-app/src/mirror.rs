//! Mirror state machine.
//!
//! [`Mirror`] holds the in-memory copy of everything the client mirrors:
//! session, workspace, channel list, user directory, per-channel history and
//! the active channel pointer. It is a pure state machine: it consumes
//! [`MirrorEvent`]s and returns [`MirrorAction`]s for the engine to execute.
//! No I/O happens here.
//!
//! # Invariants
//!
//! - Every listed channel has a (possibly empty) history entry.
//! - The active channel, if any, is in the channel list.
//! - Without a session, workspace, channels, users and history are empty.

use parley_core::{Channel, ChannelId, Message, Token, User, UserId, Workspace};
use parley_store::Slot;
use tracing::debug;

use crate::{
    DirectChannel, Directory, MessageStore, MirrorAction, MirrorEvent, SessionCredentials,
    SessionStore,
};

/// In-memory mirror of server state.
#[derive(Debug, Clone, Default)]
pub struct Mirror {
    session: SessionStore,
    directory: Directory,
    messages: MessageStore,
    active_channel: Option<ChannelId>,
}

impl Mirror {
    /// Create an empty, signed-out mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: MirrorEvent) -> Vec<MirrorAction> {
        match event {
            MirrorEvent::Restored { credentials, workspace, channels, users } => {
                self.reset();
                if let Some(credentials) = credentials {
                    self.session.establish(credentials);
                    self.directory.set_workspace(workspace);
                    self.directory.replace_users(users);
                    self.set_channels(channels);
                }
                vec![]
            },
            MirrorEvent::SessionEstablished { credentials, workspace, users, channels } => {
                self.reset();
                self.session.establish(credentials);
                self.directory.set_workspace(Some(workspace));
                self.directory.replace_users(users);
                self.set_channels(channels);
                // Previous slots go first so a partial write restores as
                // signed out, never as one user paired with another's token.
                vec![
                    MirrorAction::CloseLive,
                    MirrorAction::EraseAll,
                    MirrorAction::Persist(Slot::User),
                    MirrorAction::Persist(Slot::Token),
                    MirrorAction::Persist(Slot::Workspace),
                    MirrorAction::Persist(Slot::Users),
                    MirrorAction::Persist(Slot::Channels),
                ]
            },
            MirrorEvent::DirectoryPulled { users, channels } => {
                if !self.session.is_authenticated() {
                    debug!("directory pull without session ignored");
                    return vec![];
                }
                self.directory.replace_users(users);
                self.set_channels(channels);
                vec![MirrorAction::Persist(Slot::Users), MirrorAction::Persist(Slot::Channels)]
            },
            MirrorEvent::ChannelAdded(channel) => {
                if !self.session.is_authenticated() {
                    return vec![];
                }
                let channel_id = channel.id;
                self.directory.upsert_channel(channel);
                self.messages.ensure(channel_id);
                debug!(channel_id, "channel added");
                vec![MirrorAction::Persist(Slot::Channels)]
            },
            MirrorEvent::HistoryLoaded { channel_id, messages } => {
                if !self.directory.has_channel(channel_id) {
                    debug!(channel_id, "history for unlisted channel dropped");
                    return vec![];
                }
                debug!(channel_id, count = messages.len(), "history loaded");
                self.messages.merge_history(channel_id, messages);
                vec![]
            },
            MirrorEvent::MessageReceived(message) | MirrorEvent::MessageSent(message) => {
                if !self.session.is_authenticated() {
                    return vec![];
                }
                let channel_id = message.channel_id;
                let message_id = message.id;
                let inserted = self.messages.upsert(message);
                debug!(channel_id, message_id, inserted, "message applied");
                vec![]
            },
            MirrorEvent::ChannelSelected(channel_id) => {
                if self.directory.has_channel(channel_id) {
                    self.active_channel = Some(channel_id);
                }
                vec![]
            },
            MirrorEvent::SignedOut => {
                self.reset();
                vec![MirrorAction::CloseLive, MirrorAction::EraseAll]
            },
        }
    }

    /// Clear session, workspace, channels, history and the active channel, in
    /// that order.
    fn reset(&mut self) {
        self.session.clear();
        self.directory.clear();
        self.messages.clear();
        self.active_channel = None;
    }

    /// Replace the channel list and bring history entries and the active
    /// pointer in line with it.
    fn set_channels(&mut self, channels: Vec<Channel>) {
        self.directory.replace_channels(channels);

        let directory = &self.directory;
        self.messages.retain(|id| directory.has_channel(id));
        for channel in self.directory.channels() {
            self.messages.ensure(channel.id);
        }

        if self.active_channel.is_some_and(|id| !self.directory.has_channel(id)) {
            self.active_channel = None;
        }
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Current session.
    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.session.credentials()
    }

    /// Signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Session token.
    pub fn token(&self) -> Option<&Token> {
        self.session.token()
    }

    /// Workspace of the signed-in user.
    pub fn workspace(&self) -> Option<&Workspace> {
        self.directory.workspace()
    }

    /// Workspace, channel list and user directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Channels in list order.
    pub fn channels(&self) -> &[Channel] {
        self.directory.channels()
    }

    /// User directory entry.
    pub fn directory_user(&self, id: UserId) -> Option<&User> {
        self.directory.user(id)
    }

    /// Channels that are not one-to-one.
    pub fn group_channels(&self) -> Vec<&Channel> {
        self.directory.group_channels()
    }

    /// One-to-one channels annotated with the other participant.
    pub fn direct_channels(&self) -> Vec<DirectChannel<'_>> {
        self.directory.direct_channels(self.user().map(|u| u.id))
    }

    /// Per-channel history.
    pub fn message_store(&self) -> &MessageStore {
        &self.messages
    }

    /// History of `channel_id`, oldest first.
    pub fn messages_for(&self, channel_id: ChannelId) -> &[Message] {
        self.messages.get(channel_id)
    }

    /// ID of the active channel.
    pub fn active_channel_id(&self) -> Option<ChannelId> {
        self.active_channel
    }

    /// The active channel.
    pub fn active_channel(&self) -> Option<&Channel> {
        self.active_channel.and_then(|id| self.directory.channel(id))
    }

    /// Whether nothing is mirrored.
    pub fn is_empty(&self) -> bool {
        !self.session.is_authenticated()
            && self.directory.is_empty()
            && self.messages.is_cleared()
            && self.active_channel.is_none()
    }
}
