//! Remote collaborators of the Parley mirror engine.
//!
//! Two seams, each a trait with one production adapter:
//!
//! - [`RemoteClient`]: request/response calls against the chat service,
//!   implemented over HTTP by [`HttpRemote`]
//! - [`PushSource`]: the server-push event feed, implemented over
//!   Server-Sent Events by [`SsePushSource`]
//!
//! Both report failures as [`parley_core::RemoteError`]. Neither retries;
//! retry policy belongs to the caller.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod endpoints;
mod http;
mod sse;

use async_trait::async_trait;
pub use endpoints::{DEFAULT_CHAT_URL, DEFAULT_NOTIFICATION_URL, Endpoints};
use futures::stream::BoxStream;
pub use http::HttpRemote;
use parley_core::{
    Channel, ChannelId, Credentials, Message, OutgoingMessage, PushFrame, Registration,
    RemoteError, Token, User,
};
pub use sse::SsePushSource;

/// Stream of push frames for one connection.
///
/// Ends (or yields an `Err`) when the connection is lost. Dropping the stream
/// closes the connection.
pub type PushStream = BoxStream<'static, Result<PushFrame, RemoteError>>;

/// Request/response calls against the chat service.
///
/// Every call except `sign_up` and `sign_in` is authenticated with the
/// session token.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Create an account; returns the session token.
    async fn sign_up(&self, registration: &Registration) -> Result<Token, RemoteError>;

    /// Exchange credentials for a session token.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Token, RemoteError>;

    /// User directory of the token's workspace.
    async fn list_users(&self, token: &Token) -> Result<Vec<User>, RemoteError>;

    /// Channels visible to the token's user, in server order.
    async fn list_channels(&self, token: &Token) -> Result<Vec<Channel>, RemoteError>;

    /// History of one channel, oldest first.
    async fn list_messages(
        &self,
        token: &Token,
        channel_id: ChannelId,
    ) -> Result<Vec<Message>, RemoteError>;

    /// Post a message; returns the server's canonical copy.
    async fn send_message(
        &self,
        token: &Token,
        channel_id: ChannelId,
        message: &OutgoingMessage,
    ) -> Result<Message, RemoteError>;
}

/// Source of server-push connections.
pub trait PushSource: Send + Sync {
    /// Start a push connection authenticated with `token`.
    ///
    /// The connection is established lazily as the stream is polled; the
    /// first frame of a healthy connection is [`PushFrame::Open`].
    fn subscribe(&self, token: &Token) -> Result<PushStream, RemoteError>;
}
