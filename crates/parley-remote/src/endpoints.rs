use std::time::Duration;

use serde::Deserialize;

/// Default chat service base URL.
pub const DEFAULT_CHAT_URL: &str = "http://localhost:6688/api";

/// Default notification (SSE) URL.
pub const DEFAULT_NOTIFICATION_URL: &str = "http://localhost:6687/events";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the chat and notification services live.
///
/// Deserializes from the `[server]` table of the client configuration; every
/// field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Chat service base URL, without trailing slash.
    pub chat: String,
    /// Notification service URL.
    pub notification: String,
    /// Per-request timeout in seconds. Does not apply to push streams.
    pub request_timeout_secs: u64,
}

impl Endpoints {
    /// Endpoints rooted at the given URLs with the default timeout.
    pub fn new(chat: impl Into<String>, notification: impl Into<String>) -> Self {
        Self {
            chat: chat.into().trim_end_matches('/').to_string(),
            notification: notification.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL of a chat service path such as `/chats`.
    pub fn chat_url(&self, path: &str) -> String {
        format!("{}{path}", self.chat.trim_end_matches('/'))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_URL, DEFAULT_NOTIFICATION_URL)
    }
}
