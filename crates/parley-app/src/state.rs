//! Observable mirror state types.
//!
//! View types handed to the calling application: the session credentials,
//! the live connection state and the direct-channel view.

use parley_core::{Channel, Token, User};

/// Session credentials. User and token exist together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// Signed-in user, decoded from the token.
    pub user: User,
    /// Bearer token for remote calls and the push stream.
    pub token: Token,
}

impl SessionCredentials {
    /// Pair a user with their token.
    pub fn new(user: User, token: Token) -> Self {
        Self { user, token }
    }

    /// Pair separately restored halves. Either half missing means no session.
    pub fn from_parts(user: Option<User>, token: Option<Token>) -> Option<Self> {
        match (user, token) {
            (Some(user), Some(token)) => Some(Self::new(user, token)),
            _ => None,
        }
    }
}

/// Live connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveState {
    /// No push connection.
    #[default]
    Closed,
    /// Subscribed; waiting for the server to confirm.
    Opening,
    /// Server confirmed; events are flowing.
    Open,
}

/// A one-to-one channel annotated with the other participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectChannel<'a> {
    /// The channel.
    pub channel: &'a Channel,
    /// Directory entry of the member that is not the current user. `None` if
    /// there is no such member or it is missing from the directory.
    pub recipient: Option<&'a User>,
}
