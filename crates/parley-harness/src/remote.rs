//! Scripted chat service.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use parley_core::{
    Channel, ChannelId, Credentials, Message, MessageId, OutgoingMessage, Registration,
    RemoteError, Token, User, UserId, WorkspaceId,
};
use parley_remote::RemoteClient;
use tracing::debug;

use crate::fixtures;

/// Remote operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    /// `sign_up`
    SignUp,
    /// `sign_in`
    SignIn,
    /// `list_users`
    ListUsers,
    /// `list_channels`
    ListChannels,
    /// `list_messages`
    ListMessages,
    /// `send_message`
    SendMessage,
}

struct Account {
    password: String,
    user: User,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    workspaces: HashMap<String, WorkspaceId>,
    sessions: HashMap<Token, UserId>,
    users: Vec<User>,
    channels: Vec<Channel>,
    history: HashMap<ChannelId, Vec<Message>>,
    next_user_id: UserId,
    next_message_id: MessageId,
    failures: HashMap<Call, VecDeque<RemoteError>>,
    calls: HashMap<Call, usize>,
}

/// In-process chat service.
///
/// Clones share state, so a test can keep a handle while the engine owns
/// another. Tokens are minted with [`fixtures::mint_token`] and only tokens
/// this remote issued are accepted.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl FakeRemote {
    /// Create an empty service.
    pub fn new() -> Self {
        let remote = Self::default();
        {
            let mut state = remote.lock();
            state.next_user_id = 1;
            state.next_message_id = 1;
        }
        remote
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account. The user is also added to the directory.
    pub fn with_account(self, user: User, password: &str) -> Self {
        {
            let mut state = self.lock();
            if let Some(name) = &user.workspace_name {
                state.workspaces.insert(name.clone(), user.workspace_id);
            }
            state.next_user_id = state.next_user_id.max(user.id + 1);
            let directory_entry = User { workspace_name: None, ..user.clone() };
            upsert_user(&mut state.users, directory_entry);
            state
                .accounts
                .insert(user.email.clone(), Account { password: password.to_string(), user });
        }
        self
    }

    /// Add a directory entry.
    pub fn with_user(self, user: User) -> Self {
        {
            let mut state = self.lock();
            state.next_user_id = state.next_user_id.max(user.id + 1);
            upsert_user(&mut state.users, user);
        }
        self
    }

    /// Add a channel to the channel list.
    pub fn with_channel(self, channel: Channel) -> Self {
        self.add_channel(channel);
        self
    }

    /// Append a message to its channel's history.
    pub fn with_message(self, message: Message) -> Self {
        self.add_message(message);
        self
    }

    /// Add or replace a channel.
    pub fn add_channel(&self, channel: Channel) {
        let mut state = self.lock();
        match state.channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => *existing = channel,
            None => state.channels.push(channel),
        }
    }

    /// Remove a channel and its history.
    pub fn remove_channel(&self, channel_id: ChannelId) {
        let mut state = self.lock();
        state.channels.retain(|c| c.id != channel_id);
        state.history.remove(&channel_id);
    }

    /// Append a message to its channel's history.
    pub fn add_message(&self, message: Message) {
        let mut state = self.lock();
        state.next_message_id = state.next_message_id.max(message.id + 1);
        state.history.entry(message.channel_id).or_default().push(message);
    }

    /// Make the next `call` fail with `error`. Failures queue up per call.
    pub fn fail_next(&self, call: Call, error: RemoteError) {
        self.lock().failures.entry(call).or_default().push_back(error);
    }

    /// Number of times `call` was made, failed attempts included.
    pub fn calls(&self, call: Call) -> usize {
        self.lock().calls.get(&call).copied().unwrap_or(0)
    }

    /// Server-side history of `channel_id`.
    pub fn history(&self, channel_id: ChannelId) -> Vec<Message> {
        self.lock().history.get(&channel_id).cloned().unwrap_or_default()
    }

    /// Count `call` and pop its next scripted failure.
    fn enter(&self, call: Call) -> Result<MutexGuard<'_, State>, RemoteError> {
        let mut state = self.lock();
        *state.calls.entry(call).or_default() += 1;
        let failure = state.failures.get_mut(&call).and_then(VecDeque::pop_front);
        match failure {
            Some(error) => {
                debug!(?call, error = %error, "injected failure");
                Err(error)
            },
            None => Ok(state),
        }
    }

    fn open_session(state: &mut State, user: &User) -> Token {
        let token = fixtures::mint_token(user);
        state.sessions.insert(token.clone(), user.id);
        token
    }
}

fn upsert_user(users: &mut Vec<User>, user: User) {
    match users.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => *existing = user,
        None => users.push(user),
    }
}

fn authorize(state: &State, token: &Token) -> Result<UserId, RemoteError> {
    state
        .sessions
        .get(token)
        .copied()
        .ok_or_else(|| RemoteError::Auth { status: 401, message: "invalid token".to_string() })
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn sign_up(&self, registration: &Registration) -> Result<Token, RemoteError> {
        let mut state = self.enter(Call::SignUp)?;
        if state.accounts.contains_key(&registration.email) {
            return Err(RemoteError::Rejected {
                status: 409,
                message: "email already registered".to_string(),
            });
        }

        let next_workspace = state.workspaces.len() as WorkspaceId + 1;
        let workspace_id =
            *state.workspaces.entry(registration.workspace.clone()).or_insert(next_workspace);
        let id = state.next_user_id;
        state.next_user_id += 1;

        let user = User {
            id,
            display_name: registration.full_name.clone(),
            email: registration.email.clone(),
            workspace_id,
            workspace_name: Some(registration.workspace.clone()),
        };
        upsert_user(&mut state.users, User { workspace_name: None, ..user.clone() });
        state.accounts.insert(
            registration.email.clone(),
            Account { password: registration.password.clone(), user: user.clone() },
        );

        Ok(Self::open_session(&mut state, &user))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Token, RemoteError> {
        let mut state = self.enter(Call::SignIn)?;
        let user = state
            .accounts
            .get(&credentials.email)
            .filter(|account| account.password == credentials.password)
            .map(|account| account.user.clone())
            .ok_or_else(|| RemoteError::Auth {
                status: 403,
                message: "invalid email or password".to_string(),
            })?;

        Ok(Self::open_session(&mut state, &user))
    }

    async fn list_users(&self, token: &Token) -> Result<Vec<User>, RemoteError> {
        let state = self.enter(Call::ListUsers)?;
        authorize(&state, token)?;
        Ok(state.users.clone())
    }

    async fn list_channels(&self, token: &Token) -> Result<Vec<Channel>, RemoteError> {
        let state = self.enter(Call::ListChannels)?;
        authorize(&state, token)?;
        Ok(state.channels.clone())
    }

    async fn list_messages(
        &self,
        token: &Token,
        channel_id: ChannelId,
    ) -> Result<Vec<Message>, RemoteError> {
        let state = self.enter(Call::ListMessages)?;
        authorize(&state, token)?;
        if !state.channels.iter().any(|c| c.id == channel_id) {
            return Err(RemoteError::Rejected { status: 404, message: "no such chat".to_string() });
        }
        Ok(state.history.get(&channel_id).cloned().unwrap_or_default())
    }

    async fn send_message(
        &self,
        token: &Token,
        channel_id: ChannelId,
        message: &OutgoingMessage,
    ) -> Result<Message, RemoteError> {
        let mut state = self.enter(Call::SendMessage)?;
        let sender_id = authorize(&state, token)?;
        if !state.channels.iter().any(|c| c.id == channel_id) {
            return Err(RemoteError::Rejected { status: 404, message: "no such chat".to_string() });
        }

        let id = state.next_message_id;
        state.next_message_id += 1;
        let message = Message {
            id,
            channel_id,
            sender_id,
            content: message.content.clone(),
            files: message.files.clone(),
            created_at: fixtures::timestamp(id as i64),
        };
        state.history.entry(channel_id).or_default().push(message.clone());

        Ok(message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_core::{ChannelKind, FailureKind};

    use super::*;
    use crate::fixtures::{channel, session_user};

    fn remote() -> FakeRemote {
        FakeRemote::new()
            .with_account(session_user(42, "Ada", 7, "acme"), "pw")
            .with_channel(channel(1, ChannelKind::Group, [42]))
    }

    #[tokio::test]
    async fn wrong_password_is_auth_failure() {
        let err = remote().sign_in(&Credentials::new("ada@parley.test", "nope")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::AuthFailure);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let err = remote().list_users(&Token::new("forged")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::AuthFailure);
    }

    #[tokio::test]
    async fn send_assigns_increasing_ids() {
        let remote = remote();
        let token = remote.sign_in(&Credentials::new("ada@parley.test", "pw")).await.unwrap();

        let first = remote.send_message(&token, 1, &OutgoingMessage::text("a")).await.unwrap();
        let second = remote.send_message(&token, 1, &OutgoingMessage::text("b")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.sender_id, 42);
        assert_eq!(remote.history(1), vec![first, second]);
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let remote = remote();
        remote.fail_next(Call::SignIn, RemoteError::Network("down".into()));

        let credentials = Credentials::new("ada@parley.test", "pw");
        assert!(remote.sign_in(&credentials).await.is_err());
        assert!(remote.sign_in(&credentials).await.is_ok());
        assert_eq!(remote.calls(Call::SignIn), 2);
    }

    #[tokio::test]
    async fn sign_up_joins_existing_workspace() {
        let remote = remote();
        let registration = Registration {
            workspace: "acme".into(),
            full_name: "Bob".into(),
            email: "bob@acme.io".into(),
            password: "pw".into(),
        };
        let token = remote.sign_up(&registration).await.unwrap();

        let users = remote.list_users(&token).await.unwrap();
        let bob = users.iter().find(|u| u.email == "bob@acme.io").unwrap();
        assert_eq!(bob.workspace_id, 7);
        assert_eq!(bob.id, 43);

        let again = remote.sign_up(&registration).await.unwrap_err();
        assert_eq!(again.kind(), FailureKind::Rejected);
    }
}
