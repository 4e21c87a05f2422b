//! Push-stream frames and payload decoding.
//!
//! The notification service speaks Server-Sent Events. Transport adapters
//! reduce whatever they receive to [`PushFrame`]s; the engine only acts on
//! frames named [`NEW_MESSAGE_EVENT`].

use crate::{Message, RemoteError};

/// Event name carrying a newly posted message.
pub const NEW_MESSAGE_EVENT: &str = "NewMessage";

/// A unit delivered by a push stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    /// Connection established; events will follow.
    Open,
    /// Named event with a raw payload.
    Event {
        /// Event name (SSE `event:` field).
        name: String,
        /// Raw payload (SSE `data:` field).
        data: String,
    },
}

impl PushFrame {
    /// Build a [`NEW_MESSAGE_EVENT`] frame carrying `data`.
    pub fn new_message(data: impl Into<String>) -> Self {
        Self::Event { name: NEW_MESSAGE_EVENT.to_string(), data: data.into() }
    }
}

/// Decode a `NewMessage` payload.
///
/// The server tags the payload with an `event` field; it is transport
/// metadata and is removed before decoding.
pub fn decode_new_message(data: &str) -> Result<Message, RemoteError> {
    let mut value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| RemoteError::Decode(e.to_string()))?;

    if let Some(object) = value.as_object_mut() {
        object.remove("event");
    }

    serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_event_tag() {
        let data = r#"{"event":"NewMessage","id":11,"chatId":3,"senderId":43,
                       "content":"yo","files":[],"createdAt":"2024-05-01T10:00:00Z"}"#;
        let message = decode_new_message(data).unwrap();

        assert_eq!(message.id, 11);
        assert_eq!(message.channel_id, 3);
        assert_eq!(message.sender_id, 43);
        assert_eq!(message.content, "yo");
    }

    #[test]
    fn rejects_non_message_payload() {
        assert!(matches!(decode_new_message("not json"), Err(RemoteError::Decode(_))));
        assert!(matches!(decode_new_message(r#"{"event":"NewMessage"}"#), Err(RemoteError::Decode(_))));
    }

    proptest! {
        #[test]
        fn push_and_rest_spellings_decode_alike(
            id in any::<u64>(),
            chat in any::<u64>(),
            sender in any::<u64>(),
            content in ".*",
            files in proptest::collection::vec("[a-z/.]{1,12}", 0..3),
            secs in 0i64..4_000_000_000,
        ) {
            let created_at = Utc.timestamp_opt(secs, 0).unwrap().to_rfc3339();
            let rest = json!({
                "id": id, "chat_id": chat, "sender_id": sender,
                "content": content, "files": files, "created_at": created_at,
            });
            let push = json!({
                "event": NEW_MESSAGE_EVENT, "id": id, "chatId": chat, "senderId": sender,
                "content": content, "files": files, "createdAt": created_at,
            });

            let from_rest: Message = serde_json::from_value(rest).unwrap();
            let from_push = decode_new_message(&push.to_string()).unwrap();

            prop_assert_eq!(&from_push, &from_rest);
            prop_assert_eq!(from_push.channel_id, chat);
        }
    }
}
