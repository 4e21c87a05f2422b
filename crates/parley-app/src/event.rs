//! Mirror input events.
//!
//! This module defines [`MirrorEvent`], the set of inputs that drive the
//! [`crate::Mirror`] state machine. Every event is a fact that has already
//! happened: the engine performs remote calls first and only reports their
//! outcome.

use parley_core::{Channel, ChannelId, Message, User, Workspace};

use crate::SessionCredentials;

/// Events processed by the Mirror state machine.
#[derive(Debug, Clone)]
pub enum MirrorEvent {
    /// State read back from the durable cache at startup.
    Restored {
        /// Session, if both user and token were restored.
        credentials: Option<SessionCredentials>,
        /// Restored workspace.
        workspace: Option<Workspace>,
        /// Restored channel list.
        channels: Vec<Channel>,
        /// Restored user directory.
        users: Vec<User>,
    },

    /// Sign-in or sign-up completed, including the directory pull.
    SessionEstablished {
        /// New session.
        credentials: SessionCredentials,
        /// Workspace from the token claims.
        workspace: Workspace,
        /// Pulled user directory.
        users: Vec<User>,
        /// Pulled channel list.
        channels: Vec<Channel>,
    },

    /// Directory and channel list refreshed for the current session.
    DirectoryPulled {
        /// Pulled user directory.
        users: Vec<User>,
        /// Pulled channel list.
        channels: Vec<Channel>,
    },

    /// A channel was created or joined.
    ChannelAdded(Channel),

    /// Channel history fetched from the server.
    HistoryLoaded {
        /// Channel the history belongs to.
        channel_id: ChannelId,
        /// Messages, oldest first.
        messages: Vec<Message>,
    },

    /// Message delivered by the push stream.
    MessageReceived(Message),

    /// Server accepted a message sent by this client.
    MessageSent(Message),

    /// User switched channels.
    ChannelSelected(ChannelId),

    /// User signed out.
    SignedOut,
}
