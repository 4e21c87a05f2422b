//! Engine runtime.
//!
//! [`Engine`] owns the [`Mirror`] and its collaborators: the remote client,
//! the durable cache and the live channel. Each intent performs its remote
//! calls first, then feeds the outcome to the mirror as a [`MirrorEvent`] and
//! executes the resulting [`MirrorAction`]s before returning.
//!
//! The engine is driven by a single task holding `&mut Engine`, so intents
//! never interleave. Push updates wait in the live stream until the owner
//! polls [`Engine::next_live_update`] or [`Engine::pump_live`].

use parley_core::{
    Channel, ChannelId, Credentials, Message, OutgoingMessage, Registration, RemoteError, Token,
    TokenDecoder, User, UserId, Workspace,
};
use parley_remote::{PushSource, RemoteClient};
use parley_store::{DurableCache, Slot, SlotStore};
use tracing::{debug, info, warn};

use crate::{
    DirectChannel, LiveChannel, LiveState, LiveUpdate, Mirror, MirrorAction, MirrorError,
    MirrorEvent, SessionCredentials,
};

/// Local mirror synchronization engine.
///
/// # Type Parameters
///
/// - `R`: remote chat service client
/// - `S`: durable slot store
/// - `P`: push stream source
pub struct Engine<R, S, P>
where
    R: RemoteClient,
    S: SlotStore,
    P: PushSource,
{
    remote: R,
    cache: DurableCache<S>,
    live: LiveChannel<P>,
    decoder: TokenDecoder,
    mirror: Mirror,
}

impl<R, S, P> Engine<R, S, P>
where
    R: RemoteClient,
    S: SlotStore,
    P: PushSource,
{
    /// Create a signed-out engine. Call [`Engine::restore`] before reading.
    pub fn new(remote: R, store: S, push: P, decoder: TokenDecoder) -> Self {
        Self {
            remote,
            cache: DurableCache::new(store),
            live: LiveChannel::new(push),
            decoder,
            mirror: Mirror::new(),
        }
    }

    /// Load the mirror from the durable cache. Never touches the network.
    ///
    /// Slots that are missing or corrupt restore as absent. A user without a
    /// token (or the reverse) restores as signed out.
    pub fn restore(&mut self) {
        let user: Option<User> = self.cache.restore(Slot::User);
        let token: Option<Token> = self.cache.restore(Slot::Token);
        if user.is_some() != token.is_some() {
            warn!("restored session is incomplete, starting signed out");
        }

        let credentials = SessionCredentials::from_parts(user, token);
        let workspace: Option<Workspace> = self.cache.restore(Slot::Workspace);
        let channels: Vec<Channel> = self.cache.restore(Slot::Channels).unwrap_or_default();
        let users: Vec<User> = self.cache.restore(Slot::Users).unwrap_or_default();

        let actions =
            self.mirror.handle(MirrorEvent::Restored { credentials, workspace, channels, users });
        debug_assert!(actions.is_empty());

        info!(
            authenticated = self.mirror.is_authenticated(),
            user_id = self.mirror.user().map(|u| u.id),
            channels = self.mirror.channels().len(),
            "mirror restored"
        );
    }

    /// Sign in, decode the session token and pull directory and channels.
    ///
    /// On a remote or token failure nothing is committed and any previous
    /// session is kept. A storage failure leaves the engine signed out.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<User, MirrorError> {
        info!(email = %credentials.email, "signing in");

        let outcome = match self.remote.sign_in(credentials).await {
            Ok(token) => self.open_session(token).await,
            Err(e) => Err(e),
        };
        let event = outcome.map_err(|e| {
            warn!(error = %e, "sign-in failed");
            MirrorError::SignInFailed(e)
        })?;

        self.establish(event)
    }

    /// Create an account, then proceed as [`Engine::sign_in`].
    pub async fn sign_up(&mut self, registration: &Registration) -> Result<User, MirrorError> {
        info!(email = %registration.email, workspace = %registration.workspace, "signing up");

        let outcome = match self.remote.sign_up(registration).await {
            Ok(token) => self.open_session(token).await,
            Err(e) => Err(e),
        };
        let event = outcome.map_err(|e| {
            warn!(error = %e, "sign-up failed");
            MirrorError::SignUpFailed(e)
        })?;

        self.establish(event)
    }

    /// Decode `token` and pull everything a new session needs.
    async fn open_session(&self, token: Token) -> Result<MirrorEvent, RemoteError> {
        let identity = self.decoder.decode(&token)?;
        let (users, channels) = self.pull(&token).await?;

        Ok(MirrorEvent::SessionEstablished {
            credentials: SessionCredentials::new(identity.user, token),
            workspace: identity.workspace,
            users,
            channels,
        })
    }

    /// Commit a new session. If any slot cannot be written the engine ends
    /// up signed out, in memory and on disk, and the storage error is
    /// returned.
    fn establish(&mut self, event: MirrorEvent) -> Result<User, MirrorError> {
        if let Err(e) = self.commit(event) {
            warn!(error = %e, "session could not be persisted, signing out");
            if let Err(erase) = self.commit(MirrorEvent::SignedOut) {
                warn!(error = %erase, "erasing partial session failed");
            }
            return Err(e);
        }

        let user = self.mirror.user().cloned().ok_or(MirrorError::NotAuthenticated)?;
        info!(
            user_id = user.id,
            workspace_id = user.workspace_id,
            channels = self.mirror.channels().len(),
            users = self.mirror.directory().users().len(),
            "session established"
        );
        Ok(user)
    }

    async fn pull(&self, token: &Token) -> Result<(Vec<User>, Vec<Channel>), RemoteError> {
        futures::try_join!(self.remote.list_users(token), self.remote.list_channels(token))
    }

    /// Sign out: clear the mirror, close the live channel, erase every slot.
    ///
    /// Calling it again is a no-op.
    pub fn sign_out(&mut self) -> Result<(), MirrorError> {
        let user_id = self.mirror.user().map(|u| u.id);
        self.commit(MirrorEvent::SignedOut)?;

        if let Some(user_id) = user_id {
            info!(user_id, "signed out");
        }
        Ok(())
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.mirror.is_authenticated()
    }

    /// Open the live channel with the session token.
    ///
    /// Replaces any existing connection.
    pub fn connect_live(&mut self) -> Result<(), MirrorError> {
        let token = self.mirror.token().ok_or(MirrorError::NotAuthenticated)?;
        self.live.open(token).map_err(MirrorError::Live)
    }

    /// Close the live channel. Safe when already closed.
    pub fn disconnect_live(&mut self) {
        self.live.close();
    }

    /// Live channel state.
    pub fn live_state(&self) -> LiveState {
        self.live.state()
    }

    /// Wait for the next live update and apply it to the mirror.
    ///
    /// Returns `None` when the live channel is closed. Cancel-safe.
    pub async fn next_live_update(&mut self) -> Option<LiveUpdate> {
        let update = self.live.next_update().await?;
        self.apply_live(&update);
        Some(update)
    }

    /// Apply every live update that is ready without waiting.
    pub fn pump_live(&mut self) -> Vec<LiveUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.live.try_next_update() {
            self.apply_live(&update);
            updates.push(update);
        }
        updates
    }

    fn apply_live(&mut self, update: &LiveUpdate) {
        if let LiveUpdate::Message(message) = update {
            self.apply_incoming(message.channel_id, message.clone());
        }
    }

    /// Upsert a pushed message into `channel_id`'s history.
    ///
    /// Creates the history entry if the channel has none.
    pub fn apply_incoming(&mut self, channel_id: ChannelId, mut message: Message) {
        message.channel_id = channel_id;
        let actions = self.mirror.handle(MirrorEvent::MessageReceived(message));
        debug_assert!(actions.is_empty());
    }

    /// Re-pull directory and channel list with the session token.
    ///
    /// History of channels that are still listed is kept.
    pub async fn pull_all(&mut self) -> Result<(), MirrorError> {
        let token = self.mirror.token().cloned().ok_or(MirrorError::NotAuthenticated)?;
        let (users, channels) = self.pull(&token).await?;

        debug!(users = users.len(), channels = channels.len(), "directory pulled");
        self.commit(MirrorEvent::DirectoryPulled { users, channels })
    }

    /// Append a channel (or replace it if listed) and persist the list.
    pub fn add_channel(&mut self, channel: Channel) -> Result<(), MirrorError> {
        if !self.mirror.is_authenticated() {
            return Err(MirrorError::NotAuthenticated);
        }
        self.commit(MirrorEvent::ChannelAdded(channel))
    }

    /// Make `channel_id` the active channel. Returns `false` for unknown IDs.
    pub fn set_active_channel(&mut self, channel_id: ChannelId) -> bool {
        let actions = self.mirror.handle(MirrorEvent::ChannelSelected(channel_id));
        debug_assert!(actions.is_empty());
        self.mirror.active_channel_id() == Some(channel_id)
    }

    /// The active channel.
    pub fn active_channel(&self) -> Option<&Channel> {
        self.mirror.active_channel()
    }

    /// History of `channel_id`, fetched from the server if none is held.
    ///
    /// A channel with no messages at all is fetched again on every call.
    pub async fn fetch_history(&mut self, channel_id: ChannelId) -> Result<&[Message], MirrorError> {
        let token = self.mirror.token().cloned().ok_or(MirrorError::NotAuthenticated)?;
        if !self.mirror.directory().has_channel(channel_id) {
            return Err(MirrorError::UnknownChannel(channel_id));
        }

        if self.mirror.messages_for(channel_id).is_empty() {
            let messages = self.remote.list_messages(&token, channel_id).await?;
            self.commit(MirrorEvent::HistoryLoaded { channel_id, messages })?;
        } else {
            debug!(channel_id, "history already held");
        }

        Ok(self.mirror.messages_for(channel_id))
    }

    /// Send a text message. Nothing is inserted until the server accepts it.
    pub async fn send_message(
        &mut self,
        channel_id: ChannelId,
        content: impl Into<String>,
    ) -> Result<Message, MirrorError> {
        self.send(channel_id, OutgoingMessage::text(content)).await
    }

    /// Send a message with attachments.
    pub async fn send(
        &mut self,
        channel_id: ChannelId,
        outgoing: OutgoingMessage,
    ) -> Result<Message, MirrorError> {
        let token = self.mirror.token().cloned().ok_or(MirrorError::NotAuthenticated)?;
        if !self.mirror.directory().has_channel(channel_id) {
            return Err(MirrorError::UnknownChannel(channel_id));
        }

        let message = self.remote.send_message(&token, channel_id, &outgoing).await?;
        debug!(channel_id, message_id = message.id, "message sent");

        self.commit(MirrorEvent::MessageSent(message.clone()))?;
        Ok(message)
    }

    /// History of `channel_id`, oldest first.
    pub fn messages_for(&self, channel_id: ChannelId) -> &[Message] {
        self.mirror.messages_for(channel_id)
    }

    /// Signed-in user.
    pub fn current_user(&self) -> Option<&User> {
        self.mirror.user()
    }

    /// Workspace of the signed-in user.
    pub fn workspace(&self) -> Option<&Workspace> {
        self.mirror.workspace()
    }

    /// Channels in list order.
    pub fn channels(&self) -> &[Channel] {
        self.mirror.channels()
    }

    /// Directory entry for `user_id`.
    pub fn directory_user(&self, user_id: UserId) -> Option<&User> {
        self.mirror.directory_user(user_id)
    }

    /// Channels that are not one-to-one.
    pub fn group_channels(&self) -> Vec<&Channel> {
        self.mirror.group_channels()
    }

    /// One-to-one channels annotated with the other participant.
    pub fn direct_channels(&self) -> Vec<DirectChannel<'_>> {
        self.mirror.direct_channels()
    }

    /// The in-memory mirror.
    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Feed `event` to the mirror and execute the resulting actions.
    fn commit(&mut self, event: MirrorEvent) -> Result<(), MirrorError> {
        let actions = self.mirror.handle(event);
        self.execute(actions)
    }

    /// Execute actions in order. Every action is attempted; the first failure
    /// is returned.
    fn execute(&mut self, actions: Vec<MirrorAction>) -> Result<(), MirrorError> {
        let mut result = Ok(());

        for action in actions {
            let outcome = match action {
                MirrorAction::Persist(slot) => self.persist(slot),
                MirrorAction::CloseLive => {
                    self.live.close();
                    Ok(())
                },
                MirrorAction::EraseAll => self.cache.erase_all().map_err(MirrorError::from),
            };

            if let Err(e) = outcome {
                warn!(?action, error = %e, "mirror action failed");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        result
    }

    fn persist(&self, slot: Slot) -> Result<(), MirrorError> {
        let mirror = &self.mirror;
        let written = match slot {
            Slot::User => self.cache.persist_optional(slot, mirror.user()),
            Slot::Token => self.cache.persist_optional(slot, mirror.token()),
            Slot::Workspace => self.cache.persist_optional(slot, mirror.workspace()),
            Slot::Channels => self.cache.persist(slot, &mirror.channels()),
            Slot::Users => {
                let users: Vec<&User> = mirror.directory().users().values().collect();
                self.cache.persist(slot, &users)
            },
        };
        written.map_err(MirrorError::from)
    }
}
