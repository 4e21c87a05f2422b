//! Live update channel.
//!
//! Owns at most one push connection. The connection is a stream held
//! directly by [`LiveChannel`] rather than a background task, so closing it is
//! a synchronous drop and two connections can never overlap.
//!
//! ```text
//! Closed --open--> Opening --server confirms--> Open
//!    ^                |                           |
//!    +---- error / end of stream / close ---------+
//! ```

use futures::{FutureExt, StreamExt};
use parley_core::{Message, NEW_MESSAGE_EVENT, PushFrame, RemoteError, Token, decode_new_message};
use parley_remote::{PushSource, PushStream};
use tracing::{debug, info, warn};

use crate::LiveState;

/// Something the live channel reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveUpdate {
    /// Server confirmed the connection.
    Opened,
    /// A new message was pushed.
    Message(Message),
    /// Connection lost. No reconnect is attempted.
    Closed {
        /// Why the connection ended.
        reason: RemoteError,
    },
}

/// Single push connection and its state.
pub struct LiveChannel<P: PushSource> {
    source: P,
    stream: Option<PushStream>,
    state: LiveState,
}

impl<P: PushSource> LiveChannel<P> {
    /// Create a closed channel over `source`.
    pub fn new(source: P) -> Self {
        Self { source, stream: None, state: LiveState::Closed }
    }

    /// Current state.
    pub fn state(&self) -> LiveState {
        self.state
    }

    /// Whether a connection is held (opening or open).
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Push source this channel subscribes to.
    pub fn source(&self) -> &P {
        &self.source
    }

    /// Open a connection authenticated with `token`.
    ///
    /// Any existing connection is closed first.
    pub fn open(&mut self, token: &Token) -> Result<(), RemoteError> {
        self.close();

        let stream = self.source.subscribe(token)?;
        self.stream = Some(stream);
        self.state = LiveState::Opening;
        info!("live channel opening");
        Ok(())
    }

    /// Close the connection. Safe when already closed.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            info!("live channel closed");
        }
        self.state = LiveState::Closed;
    }

    /// Wait for the next update.
    ///
    /// Returns `None` immediately when closed. Events other than new messages
    /// and undecodable payloads are skipped. Cancel-safe: dropping the future
    /// loses no frames.
    pub async fn next_update(&mut self) -> Option<LiveUpdate> {
        loop {
            let stream = self.stream.as_mut()?;

            match stream.next().await {
                Some(Ok(PushFrame::Open)) => {
                    self.state = LiveState::Open;
                    info!("live channel open");
                    return Some(LiveUpdate::Opened);
                },
                Some(Ok(PushFrame::Event { name, data })) => {
                    if name != NEW_MESSAGE_EVENT {
                        debug!(event = %name, "ignoring push event");
                        continue;
                    }
                    match decode_new_message(&data) {
                        Ok(message) => return Some(LiveUpdate::Message(message)),
                        Err(e) => {
                            warn!(error = %e, "skipping undecodable push payload");
                        },
                    }
                },
                Some(Err(reason)) => {
                    self.stream = None;
                    self.state = LiveState::Closed;
                    warn!(error = %reason, "live channel lost");
                    return Some(LiveUpdate::Closed { reason });
                },
                None => {
                    self.stream = None;
                    self.state = LiveState::Closed;
                    warn!("live channel ended");
                    let reason = RemoteError::Network("push stream ended".to_string());
                    return Some(LiveUpdate::Closed { reason });
                },
            }
        }
    }

    /// Next update if one is ready without waiting.
    pub fn try_next_update(&mut self) -> Option<LiveUpdate> {
        self.next_update().now_or_never().flatten()
    }
}
