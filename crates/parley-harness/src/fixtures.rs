//! Fixture builders.
//!
//! Tokens are HS256 JWTs signed with [`TOKEN_SECRET`] whose claims are the
//! user itself, the way the chat server issues them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header};
use parley_core::{
    Channel, ChannelId, ChannelKind, Message, MessageId, Token, TokenDecoder, TokenPolicy, User,
    UserId, WorkspaceId,
};

/// Secret fixture tokens are signed with.
pub const TOKEN_SECRET: &[u8] = b"parley-harness-secret";

/// Timestamp all fixture messages are offset from.
const EPOCH_SECS: i64 = 1_714_557_600;

/// Directory entry without a workspace name.
pub fn user(id: UserId, name: &str, workspace_id: WorkspaceId) -> User {
    User {
        id,
        display_name: name.to_string(),
        email: format!("{}@parley.test", name.to_lowercase().replace(' ', ".")),
        workspace_id,
        workspace_name: None,
    }
}

/// Session user as it appears in token claims.
pub fn session_user(id: UserId, name: &str, workspace_id: WorkspaceId, workspace: &str) -> User {
    User { workspace_name: Some(workspace.to_string()), ..user(id, name, workspace_id) }
}

/// Channel with the given members.
pub fn channel(
    id: ChannelId,
    kind: ChannelKind,
    members: impl IntoIterator<Item = UserId>,
) -> Channel {
    let name = (!kind.is_single()).then(|| format!("channel-{id}"));
    Channel { id, kind, name, members: members.into_iter().collect::<BTreeSet<_>>() }
}

/// Message created `id` seconds after the fixture epoch.
pub fn message(id: MessageId, channel_id: ChannelId, sender_id: UserId, content: &str) -> Message {
    Message {
        id,
        channel_id,
        sender_id,
        content: content.to_string(),
        files: Vec::new(),
        created_at: timestamp(id as i64),
    }
}

/// Fixture epoch plus `offset_secs`.
pub fn timestamp(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(EPOCH_SECS + offset_secs, 0).unwrap_or_default()
}

/// Session token carrying `user` as claims.
///
/// Returns an unsigned placeholder if encoding fails, which decoders reject
/// as malformed.
pub fn mint_token(user: &User) -> Token {
    let claims = serde_json::to_value(user).unwrap_or_default();
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(TOKEN_SECRET))
        .map_or_else(|_| Token::new("unsigned"), Token::new)
}

/// Decoder that verifies fixture tokens.
pub fn verifying_decoder() -> TokenDecoder {
    TokenDecoder::new(TokenPolicy::verify_secret(TOKEN_SECRET))
}
