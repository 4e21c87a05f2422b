//! Mirrored entities.
//!
//! Field names follow the chat server's JSON. The server is not consistent
//! between REST bodies (`chat_id`), token claims (`wsId`) and push payloads
//! (`chatId`), so the fields accept every spelling on input and serialize
//! under a single canonical name.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned user ID.
pub type UserId = u64;

/// Server-assigned workspace ID.
pub type WorkspaceId = u64;

/// Server-assigned channel (chat) ID.
pub type ChannelId = u64;

/// Server-assigned message ID.
pub type MessageId = u64;

/// Bearer token returned by sign-in and sign-up.
///
/// `Debug` never prints the token so it can't leak into logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token string, for use in request headers only.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// A user profile.
///
/// The session user is decoded from token claims; directory entries come from
/// `GET /users` and usually lack the workspace name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    #[serde(rename = "fullname", alias = "fullName", alias = "display_name")]
    pub display_name: String,
    /// Email address. Empty when the server omits it.
    #[serde(default)]
    pub email: String,
    /// Workspace the user belongs to.
    #[serde(rename = "wsId", alias = "ws_id", alias = "workspace_id", default)]
    pub workspace_id: WorkspaceId,
    /// Workspace name, present in token claims.
    #[serde(
        rename = "wsName",
        alias = "ws_name",
        alias = "workspace_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workspace_name: Option<String>,
}

/// The workspace of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace ID.
    pub id: WorkspaceId,
    /// Workspace name.
    pub name: String,
}

/// Channel type as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// One-to-one conversation.
    #[serde(alias = "Single")]
    Single,
    /// Ad-hoc group conversation.
    #[serde(alias = "Group")]
    Group,
    /// Invite-only named channel.
    #[serde(alias = "privateChannel", alias = "PrivateChannel")]
    PrivateChannel,
    /// Named channel open to the workspace.
    #[serde(alias = "publicChannel", alias = "PublicChannel")]
    PublicChannel,
    /// Kind this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ChannelKind {
    /// Whether this is a one-to-one conversation.
    pub fn is_single(self) -> bool {
        matches!(self, Self::Single)
    }
}

/// A channel the user can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel ID.
    pub id: ChannelId,
    /// Channel type.
    #[serde(rename = "type", alias = "kind")]
    pub kind: ChannelKind,
    /// Channel name. Direct conversations usually have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Member user IDs.
    #[serde(default)]
    pub members: BTreeSet<UserId>,
}

impl Channel {
    /// The one member that is not `me`. `None` if every member is `me`.
    ///
    /// Only meaningful for [`ChannelKind::Single`] channels.
    pub fn counterpart(&self, me: Option<UserId>) -> Option<UserId> {
        self.members.iter().copied().find(|member| Some(*member) != me)
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned message ID.
    pub id: MessageId,
    /// Channel the message belongs to.
    #[serde(rename = "chat_id", alias = "chatId", alias = "channel_id")]
    pub channel_id: ChannelId,
    /// Author.
    #[serde(alias = "senderId")]
    pub sender_id: UserId,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Attached file URLs.
    #[serde(default)]
    pub files: Vec<String>,
    /// Server timestamp.
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /chats/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    /// Text content.
    pub content: String,
    /// Attached file URLs.
    pub files: Vec<String>,
}

impl OutgoingMessage {
    /// A text-only message.
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), files: Vec::new() }
    }
}

/// Sign-in request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Build credentials from an email and password.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up request body.
#[derive(Clone, Serialize)]
pub struct Registration {
    /// Workspace to create or join.
    pub workspace: String,
    /// Display name.
    pub full_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("workspace", &self.workspace)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
