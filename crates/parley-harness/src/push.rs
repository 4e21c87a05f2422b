//! Scripted push source.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::{StreamExt, channel::mpsc};
use parley_core::{Message, PushFrame, RemoteError, Token};
use parley_remote::{PushSource, PushStream};

type Frame = Result<PushFrame, RemoteError>;

#[derive(Default)]
struct Subscriptions {
    senders: Vec<mpsc::UnboundedSender<Frame>>,
    tokens: Vec<Token>,
    refuse: Option<RemoteError>,
}

/// Push source fed by the test.
///
/// Each `subscribe` creates a fresh in-memory stream. The test drives the
/// most recent one through a [`PushHandle`]. Frames sent while no stream is
/// subscribed are dropped, like a real server would.
#[derive(Clone, Default)]
pub struct ScriptedPush {
    inner: Arc<Mutex<Subscriptions>>,
}

impl ScriptedPush {
    /// Create a source and the handle that feeds it.
    pub fn new() -> (Self, PushHandle) {
        let source = Self::default();
        let handle = PushHandle { inner: Arc::clone(&source.inner) };
        (source, handle)
    }
}

fn lock(inner: &Mutex<Subscriptions>) -> MutexGuard<'_, Subscriptions> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PushSource for ScriptedPush {
    fn subscribe(&self, token: &Token) -> Result<PushStream, RemoteError> {
        let mut subs = lock(&self.inner);
        if let Some(error) = subs.refuse.take() {
            return Err(error);
        }

        let (tx, rx) = mpsc::unbounded();
        subs.senders.push(tx);
        subs.tokens.push(token.clone());
        Ok(rx.boxed())
    }
}

/// Test-side control of a [`ScriptedPush`].
#[derive(Clone)]
pub struct PushHandle {
    inner: Arc<Mutex<Subscriptions>>,
}

impl PushHandle {
    /// Number of `subscribe` calls that succeeded.
    pub fn subscriptions(&self) -> usize {
        lock(&self.inner).senders.len()
    }

    /// Number of subscribed streams still held by a receiver.
    pub fn open_streams(&self) -> usize {
        lock(&self.inner).senders.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Token the most recent subscription was made with.
    pub fn last_token(&self) -> Option<Token> {
        lock(&self.inner).tokens.last().cloned()
    }

    /// Make the next `subscribe` fail with `error`.
    pub fn refuse_next(&self, error: RemoteError) {
        lock(&self.inner).refuse = Some(error);
    }

    /// Send a frame on the most recent stream. Returns `false` if nobody is
    /// listening.
    pub fn send(&self, frame: PushFrame) -> bool {
        self.send_raw(Ok(frame))
    }

    /// Confirm the connection.
    pub fn open(&self) -> bool {
        self.send(PushFrame::Open)
    }

    /// Push a `NewMessage` event carrying `message`, tagged the way the
    /// notification service tags it.
    pub fn push_message(&self, message: &Message) -> bool {
        let mut payload = serde_json::to_value(message).unwrap_or_default();
        if let Some(object) = payload.as_object_mut() {
            object.insert("event".to_string(), serde_json::Value::from("NewMessage"));
        }
        self.send(PushFrame::new_message(payload.to_string()))
    }

    /// Fail the most recent stream with `error`.
    pub fn fail(&self, error: RemoteError) -> bool {
        self.send_raw(Err(error))
    }

    /// End the most recent stream.
    pub fn end(&self) {
        if let Some(tx) = lock(&self.inner).senders.last() {
            tx.close_channel();
        }
    }

    fn send_raw(&self, frame: Frame) -> bool {
        lock(&self.inner).senders.last().is_some_and(|tx| tx.unbounded_send(frame).is_ok())
    }
}
