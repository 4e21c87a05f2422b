//! Server-Sent Events adapter for the notification service.
//!
//! `reqwest-eventsource` reconnects by itself when polled after an error. The
//! mirror wants exactly one connection attempt per `subscribe`, so the stream
//! ends after the first error it reports.

use futures::{StreamExt, stream};
use parley_core::{PushFrame, RemoteError, Token};
use reqwest_eventsource::{Event, EventSource};
use tracing::debug;

use crate::{Endpoints, PushSource, PushStream};

/// [`PushSource`] over Server-Sent Events.
#[derive(Debug, Clone)]
pub struct SsePushSource {
    client: reqwest::Client,
    url: String,
}

impl SsePushSource {
    /// Push source for the configured notification URL.
    ///
    /// Push connections are long-lived, so the request timeout is not applied.
    pub fn new(endpoints: &Endpoints) -> Result<Self, RemoteError> {
        let client =
            reqwest::Client::builder().build().map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self { client, url: endpoints.notification.clone() })
    }
}

impl PushSource for SsePushSource {
    fn subscribe(&self, token: &Token) -> Result<PushStream, RemoteError> {
        let request = self
            .client
            .get(&self.url)
            .query(&[("token", token.as_str())])
            .header("Accept", "text/event-stream");

        let source = EventSource::new(request).map_err(|e| RemoteError::Network(e.to_string()))?;
        debug!(url = %self.url, "subscribing to push stream");

        let frames = stream::unfold(Some(source), |state| async move {
            let mut source = state?;
            match source.next().await? {
                Ok(Event::Open) => Some((Ok(PushFrame::Open), Some(source))),
                Ok(Event::Message(msg)) => {
                    let frame = PushFrame::Event { name: msg.event, data: msg.data };
                    Some((Ok(frame), Some(source)))
                },
                Err(e) => {
                    source.close();
                    Some((Err(map_error(e)), None))
                },
            }
        });

        Ok(frames.boxed())
    }
}

fn map_error(err: reqwest_eventsource::Error) -> RemoteError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _) => {
            let status = status.as_u16();
            let message = "push stream refused".to_string();
            if status == 401 || status == 403 {
                RemoteError::Auth { status, message }
            } else {
                RemoteError::Rejected { status, message }
            }
        },
        reqwest_eventsource::Error::StreamEnded => {
            RemoteError::Network("push stream ended".to_string())
        },
        reqwest_eventsource::Error::Utf8(e) => RemoteError::Decode(e.to_string()),
        reqwest_eventsource::Error::Parser(e) => RemoteError::Decode(e.to_string()),
        other => RemoteError::Network(other.to_string()),
    }
}
