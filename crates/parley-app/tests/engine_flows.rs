//! End-to-end engine flows against the in-process fakes.
//!
//! Every test drives a real [`Engine`] over a [`FakeRemote`], a
//! [`ScriptedPush`] and a shared [`MemorySlotStore`], then checks the mirror,
//! the remote's call counters and the durable slots.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parley_app::{Engine, LiveState, LiveUpdate, MirrorError};
use parley_core::{
    ChannelKind, Credentials, FailureKind, Message, PushFrame, Registration, RemoteError,
    TokenDecoder, TokenPolicy,
};
use parley_harness::{
    Call, FakeRemote, InvariantRegistry, MirrorSnapshot, PushHandle, ScriptedPush,
    fixtures::{channel, message, session_user, user, verifying_decoder},
};
use parley_store::{ChaoticSlotStore, MemorySlotStore, Slot, SlotStore, StorageError};

type TestEngine = Engine<FakeRemote, MemorySlotStore, ScriptedPush>;

struct World {
    engine: TestEngine,
    remote: FakeRemote,
    store: MemorySlotStore,
    push: PushHandle,
}

impl World {
    /// Ada (42) and Bob (43) in workspace 7, a group channel 1 with two
    /// messages and an empty direct channel 3.
    fn new() -> Self {
        Self::with_remote(acme(), MemorySlotStore::new())
    }

    fn with_remote(remote: FakeRemote, store: MemorySlotStore) -> Self {
        let (source, push) = ScriptedPush::new();
        let mut engine =
            Engine::new(remote.clone(), store.clone(), source, verifying_decoder());
        engine.restore();
        Self { engine, remote, store, push }
    }

    /// A second process over the same server and durable slots.
    fn restart(&self) -> Self {
        Self::with_remote(self.remote.clone(), self.store.clone())
    }

    async fn signed_in() -> Self {
        let mut world = Self::new();
        world.engine.sign_in(&ada()).await.unwrap();
        world
    }

    fn assert_invariants(&self, context: &str) {
        let snapshot = MirrorSnapshot::from_mirror(self.engine.mirror());
        InvariantRegistry::standard().assert_all(&snapshot, context);
    }
}

fn acme() -> FakeRemote {
    FakeRemote::new()
        .with_account(session_user(42, "Ada", 7, "acme"), "pw")
        .with_user(user(43, "Bob", 7))
        .with_channel(channel(1, ChannelKind::Group, [42, 43]))
        .with_channel(channel(3, ChannelKind::Single, [42, 43]))
        .with_message(message(1, 1, 43, "hello"))
        .with_message(message(2, 1, 42, "hi bob"))
}

fn ada() -> Credentials {
    Credentials::new("ada@parley.test", "pw")
}

fn ids(messages: &[Message]) -> Vec<u64> {
    messages.iter().map(|m| m.id).collect()
}

#[tokio::test]
async fn sign_in_pulls_directory_and_channels() {
    let mut world = World::new();

    let user = world.engine.sign_in(&ada()).await.unwrap();

    assert_eq!(user.id, 42);
    assert_eq!(user.workspace_id, 7);
    assert!(world.engine.is_authenticated());
    assert_eq!(world.engine.workspace().map(|w| w.name.as_str()), Some("acme"));
    assert!(world.engine.directory_user(42).is_some());
    assert_eq!(world.remote.calls(Call::ListUsers), 1);
    assert_eq!(world.remote.calls(Call::ListChannels), 1);
    world.assert_invariants("after sign-in");
}

#[tokio::test]
async fn direct_channel_recipient_is_the_other_member() {
    let world = World::signed_in().await;

    let direct = world.engine.direct_channels();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].channel.id, 3);
    assert_eq!(direct[0].recipient.map(|u| u.display_name.as_str()), Some("Bob"));

    let group: Vec<_> = world.engine.group_channels().iter().map(|c| c.id).collect();
    assert_eq!(group, vec![1]);
}

#[tokio::test]
async fn sign_in_does_not_open_live_channel() {
    let world = World::signed_in().await;

    assert_eq!(world.engine.live_state(), LiveState::Closed);
    assert_eq!(world.push.subscriptions(), 0);
}

#[tokio::test]
async fn sign_in_persists_every_slot() {
    let world = World::signed_in().await;
    assert_eq!(world.store.len(), Slot::ALL.len());

    let restarted = world.restart();

    assert!(restarted.engine.is_authenticated());
    assert_eq!(restarted.engine.current_user(), world.engine.current_user());
    assert_eq!(restarted.engine.workspace(), world.engine.workspace());
    assert_eq!(restarted.engine.channels(), world.engine.channels());
    assert!(restarted.engine.directory_user(43).is_some());
    restarted.assert_invariants("after restore");
}

#[tokio::test]
async fn wrong_password_commits_nothing() {
    let mut world = World::new();

    let err = world.engine.sign_in(&Credentials::new("ada@parley.test", "nope")).await;

    let err = err.unwrap_err();
    assert!(matches!(err, MirrorError::SignInFailed(_)));
    assert_eq!(err.kind(), FailureKind::AuthFailure);
    assert!(!world.engine.is_authenticated());
    assert!(world.store.is_empty());
    world.assert_invariants("after failed sign-in");
}

#[tokio::test]
async fn failed_pull_keeps_previous_session() {
    let mut world = World::signed_in().await;
    world.remote.fail_next(Call::ListChannels, RemoteError::Network("reset".into()));

    let err = world.engine.sign_in(&ada()).await.unwrap_err();

    assert!(matches!(err, MirrorError::SignInFailed(_)));
    assert_eq!(err.kind(), FailureKind::NetworkFailure);
    assert_eq!(world.engine.current_user().map(|u| u.id), Some(42));
    assert_eq!(world.engine.channels().len(), 2);
}

#[tokio::test]
async fn unverifiable_token_fails_sign_in() {
    let remote = FakeRemote::new().with_account(session_user(42, "Ada", 7, "acme"), "pw");
    let (source, _push) = ScriptedPush::new();
    let decoder = TokenDecoder::new(TokenPolicy::verify_secret(b"some-other-secret"));
    let mut engine = Engine::new(remote.clone(), MemorySlotStore::new(), source, decoder);

    let err = engine.sign_in(&ada()).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::DecodeFailure);
    assert!(!engine.is_authenticated());
    assert_eq!(remote.calls(Call::ListUsers), 0);
}

#[tokio::test]
async fn sign_up_establishes_session_in_named_workspace() {
    let mut world = World::new();
    let registration = Registration {
        workspace: "acme".into(),
        full_name: "Cleo".into(),
        email: "cleo@acme.io".into(),
        password: "pw".into(),
    };

    let user = world.engine.sign_up(&registration).await.unwrap();

    assert_eq!(user.display_name, "Cleo");
    assert_eq!(world.engine.workspace().map(|w| w.id), Some(7));
    assert!(world.engine.directory_user(user.id).is_some());

    let err = world.engine.sign_up(&registration).await.unwrap_err();
    assert!(matches!(err, MirrorError::SignUpFailed(_)));
    assert_eq!(err.kind(), FailureKind::Rejected);
    assert_eq!(world.engine.current_user().map(|u| u.id), Some(user.id));
}

#[tokio::test]
async fn sign_out_clears_mirror_and_slots() {
    let mut world = World::signed_in().await;
    world.engine.fetch_history(1).await.unwrap();
    world.engine.connect_live().unwrap();

    world.engine.sign_out().unwrap();

    assert!(!world.engine.is_authenticated());
    assert!(world.engine.mirror().is_empty());
    assert!(world.store.is_empty());
    assert_eq!(world.engine.live_state(), LiveState::Closed);
    assert_eq!(world.push.open_streams(), 0);
    world.assert_invariants("after sign-out");

    world.engine.sign_out().unwrap();
    assert!(!world.restart().engine.is_authenticated());
}

#[tokio::test]
async fn tampered_slot_restores_as_absent() {
    let world = World::signed_in().await;
    world.store.tamper(Slot::Channels, b"\xff\x00garbage").unwrap();

    let restarted = world.restart();

    assert!(restarted.engine.is_authenticated());
    assert!(restarted.engine.channels().is_empty());
    assert!(restarted.engine.directory_user(43).is_some());
    restarted.assert_invariants("after partial restore");
}

#[tokio::test]
async fn half_session_restores_signed_out() {
    let world = World::signed_in().await;
    world.store.tamper(Slot::Token, b"\xff").unwrap();

    let restarted = world.restart();

    assert!(!restarted.engine.is_authenticated());
    assert!(restarted.engine.mirror().is_empty());
}

#[tokio::test]
async fn fetch_history_calls_remote_once() {
    let mut world = World::signed_in().await;

    let first = ids(world.engine.fetch_history(1).await.unwrap());
    let second = ids(world.engine.fetch_history(1).await.unwrap());

    assert_eq!(first, vec![1, 2]);
    assert_eq!(second, first);
    assert_eq!(world.remote.calls(Call::ListMessages), 1);
}

#[tokio::test]
async fn empty_history_is_fetched_again() {
    let mut world = World::signed_in().await;

    assert!(world.engine.fetch_history(3).await.unwrap().is_empty());
    assert!(world.engine.fetch_history(3).await.unwrap().is_empty());

    assert_eq!(world.remote.calls(Call::ListMessages), 2);
}

#[tokio::test]
async fn fetch_history_requires_known_channel_and_session() {
    let mut world = World::new();
    assert_eq!(world.engine.fetch_history(1).await.unwrap_err(), MirrorError::NotAuthenticated);

    world.engine.sign_in(&ada()).await.unwrap();
    assert_eq!(world.engine.fetch_history(99).await.unwrap_err(), MirrorError::UnknownChannel(99));
    assert_eq!(world.remote.calls(Call::ListMessages), 0);
}

#[tokio::test]
async fn incoming_message_is_appended_after_history() {
    let mut world = World::signed_in().await;
    world.engine.fetch_history(1).await.unwrap();

    world.engine.apply_incoming(1, message(3, 1, 43, "m3"));

    assert_eq!(ids(world.engine.messages_for(1)), vec![1, 2, 3]);
}

#[tokio::test]
async fn redelivered_message_replaces_in_place() {
    let mut world = World::signed_in().await;
    world.engine.fetch_history(1).await.unwrap();

    world.engine.apply_incoming(1, message(1, 1, 43, "hello (edited)"));

    let held = world.engine.messages_for(1);
    assert_eq!(ids(held), vec![1, 2]);
    assert_eq!(held[0].content, "hello (edited)");
    world.assert_invariants("after redelivery");
}

#[tokio::test]
async fn incoming_message_before_history_is_kept_on_fetch() {
    let mut world = World::signed_in().await;
    world.engine.apply_incoming(1, message(7, 1, 43, "early push"));

    let held = ids(world.engine.fetch_history(1).await.unwrap());

    // A populated entry is treated as fetched.
    assert_eq!(held, vec![7]);
    assert_eq!(world.remote.calls(Call::ListMessages), 0);
}

#[tokio::test]
async fn send_then_push_echo_holds_message_once() {
    let mut world = World::signed_in().await;
    world.engine.connect_live().unwrap();

    let sent = world.engine.send_message(3, "hi").await.unwrap();

    assert_eq!(sent.id, 3);
    assert_eq!(sent.sender_id, 42);
    assert_eq!(ids(world.engine.messages_for(3)), vec![3]);

    assert!(world.push.open());
    assert!(world.push.push_message(&sent));
    let updates = world.engine.pump_live();

    assert_eq!(updates, vec![LiveUpdate::Opened, LiveUpdate::Message(sent.clone())]);
    assert_eq!(ids(world.engine.messages_for(3)), vec![3]);
    world.assert_invariants("after echo");
}

#[tokio::test]
async fn send_to_unknown_channel_makes_no_remote_call() {
    let mut world = World::signed_in().await;

    let err = world.engine.send_message(99, "hi").await.unwrap_err();

    assert_eq!(err, MirrorError::UnknownChannel(99));
    assert_eq!(world.remote.calls(Call::SendMessage), 0);
}

#[tokio::test]
async fn failed_send_inserts_nothing() {
    let mut world = World::signed_in().await;
    world.remote.fail_next(
        Call::SendMessage,
        RemoteError::Rejected { status: 503, message: "busy".into() },
    );

    let err = world.engine.send_message(3, "hi").await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Rejected);
    assert!(world.engine.messages_for(3).is_empty());
}

#[tokio::test]
async fn connect_twice_keeps_one_connection() {
    let mut world = World::signed_in().await;

    world.engine.connect_live().unwrap();
    world.engine.connect_live().unwrap();

    assert_eq!(world.push.subscriptions(), 2);
    assert_eq!(world.push.open_streams(), 1);
    assert_eq!(world.engine.live_state(), LiveState::Opening);
}

#[tokio::test]
async fn live_channel_lifecycle() {
    let mut world = World::signed_in().await;
    world.engine.connect_live().unwrap();
    assert!(world.push.last_token().is_some());

    world.push.open();
    assert_eq!(world.engine.next_live_update().await, Some(LiveUpdate::Opened));
    assert_eq!(world.engine.live_state(), LiveState::Open);

    let pushed = message(10, 1, 43, "pushed");
    world.push.push_message(&pushed);
    assert_eq!(world.engine.next_live_update().await, Some(LiveUpdate::Message(pushed)));
    assert_eq!(ids(world.engine.messages_for(1)), vec![10]);

    let reason = RemoteError::Network("connection reset".into());
    world.push.fail(reason.clone());
    assert_eq!(world.engine.next_live_update().await, Some(LiveUpdate::Closed { reason }));
    assert_eq!(world.engine.live_state(), LiveState::Closed);
    assert_eq!(world.engine.next_live_update().await, None);
}

#[tokio::test]
async fn unrelated_and_undecodable_events_are_skipped() {
    let mut world = World::signed_in().await;
    world.engine.connect_live().unwrap();

    world.push.send(PushFrame::Event { name: "Typing".into(), data: "{}".into() });
    world.push.send(PushFrame::new_message("not json"));
    let pushed = message(11, 3, 43, "still here");
    world.push.push_message(&pushed);

    assert_eq!(world.engine.pump_live(), vec![LiveUpdate::Message(pushed)]);
    assert_ne!(world.engine.live_state(), LiveState::Closed);
}

#[tokio::test]
async fn live_channel_needs_session() {
    let mut world = World::new();
    assert_eq!(world.engine.connect_live().unwrap_err(), MirrorError::NotAuthenticated);

    world.engine.sign_in(&ada()).await.unwrap();
    world.push.refuse_next(RemoteError::Auth { status: 401, message: "expired".into() });

    let err = world.engine.connect_live().unwrap_err();
    assert!(matches!(err, MirrorError::Live(_)));
    assert_eq!(err.kind(), FailureKind::AuthFailure);
    assert_eq!(world.engine.live_state(), LiveState::Closed);
}

#[tokio::test]
async fn pull_all_refreshes_channels_and_keeps_history() {
    let mut world = World::signed_in().await;
    world.engine.fetch_history(1).await.unwrap();
    assert!(world.engine.set_active_channel(3));

    world.remote.remove_channel(3);
    world.remote.add_channel(channel(4, ChannelKind::PublicChannel, [42]));
    world.engine.pull_all().await.unwrap();

    let listed: Vec<_> = world.engine.channels().iter().map(|c| c.id).collect();
    assert_eq!(listed, vec![1, 4]);
    assert_eq!(ids(world.engine.messages_for(1)), vec![1, 2]);
    assert!(world.engine.messages_for(4).is_empty());
    assert_eq!(world.engine.active_channel(), None);
    world.assert_invariants("after refresh");

    let restarted = world.restart();
    assert_eq!(restarted.engine.channels(), world.engine.channels());
}

#[tokio::test]
async fn add_channel_is_listed_and_persisted() {
    let mut world = World::new();
    let created = channel(5, ChannelKind::PrivateChannel, [42, 43]);
    assert_eq!(world.engine.add_channel(created.clone()), Err(MirrorError::NotAuthenticated));

    world.engine.sign_in(&ada()).await.unwrap();
    world.engine.add_channel(created.clone()).unwrap();

    assert_eq!(world.engine.channels().last(), Some(&created));
    assert!(world.engine.mirror().message_store().contains(5));
    assert_eq!(world.restart().engine.channels().last(), Some(&created));
    world.assert_invariants("after add_channel");
}

#[tokio::test]
async fn active_channel_must_be_listed() {
    let mut world = World::signed_in().await;

    assert!(!world.engine.set_active_channel(99));
    assert!(world.engine.set_active_channel(1));
    assert_eq!(world.engine.active_channel().map(|c| c.id), Some(1));
}

#[tokio::test]
async fn storage_failure_during_sign_in_signs_out() {
    let remote = FakeRemote::new().with_account(session_user(42, "Ada", 7, "acme"), "pw");
    let (source, _push) = ScriptedPush::new();
    let store = ChaoticSlotStore::with_seed(MemorySlotStore::new(), 1.0, 7);
    let mut engine = Engine::new(remote, store, source, verifying_decoder());

    let err = engine.sign_in(&ada()).await.unwrap_err();

    assert!(matches!(err, MirrorError::Storage(_)));
    assert_eq!(err.kind(), FailureKind::Storage);
    assert!(!engine.is_authenticated());
    assert!(engine.mirror().is_empty());
}

/// Memory store whose token writes fail while `failing` is set.
#[derive(Clone)]
struct TokenWritesFail {
    inner: MemorySlotStore,
    failing: Arc<AtomicBool>,
}

impl SlotStore for TokenWritesFail {
    fn put(&self, slot: Slot, bytes: &[u8]) -> Result<(), StorageError> {
        if slot == Slot::Token && self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".into()));
        }
        self.inner.put(slot, bytes)
    }

    fn get(&self, slot: Slot) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(slot)
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        self.inner.remove(slot)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}

#[tokio::test]
async fn failed_token_write_never_pairs_user_with_old_token() {
    let remote = acme();
    let store = TokenWritesFail { inner: MemorySlotStore::new(), failing: Arc::default() };
    let (source, _push) = ScriptedPush::new();
    let mut engine = Engine::new(remote.clone(), store.clone(), source, verifying_decoder());
    engine.sign_in(&ada()).await.unwrap();

    store.failing.store(true, Ordering::SeqCst);
    let cleo = Registration {
        workspace: "acme".into(),
        full_name: "Cleo".into(),
        email: "cleo@acme.io".into(),
        password: "pw".into(),
    };
    let err = engine.sign_up(&cleo).await.unwrap_err();

    assert!(matches!(err, MirrorError::Storage(_)));
    assert!(!engine.is_authenticated());
    assert!(engine.mirror().is_empty());

    let restarted = World::with_remote(remote, store.inner.clone());
    assert!(!restarted.engine.is_authenticated());
    assert!(restarted.engine.mirror().is_empty());

    store.failing.store(false, Ordering::SeqCst);
    assert_eq!(engine.sign_in(&ada()).await.unwrap().id, 42);
}
