//! Per-channel message history.
//!
//! Each channel holds its messages oldest first, newest last. Insertion is
//! keyed by message ID: a message arriving twice (history fetch, send
//! response, push echo) replaces the held copy in place.

use std::collections::HashMap;

use parley_core::{ChannelId, Message};

/// Channel ID to ordered message sequence.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    channels: HashMap<ChannelId, Vec<Message>>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `channel_id` has an entry, empty if new.
    pub fn ensure(&mut self, channel_id: ChannelId) {
        self.channels.entry(channel_id).or_default();
    }

    /// Whether `channel_id` has an entry (possibly empty).
    pub fn contains(&self, channel_id: ChannelId) -> bool {
        self.channels.contains_key(&channel_id)
    }

    /// Messages of `channel_id`, oldest first. Empty for unknown channels.
    pub fn get(&self, channel_id: ChannelId) -> &[Message] {
        self.channels.get(&channel_id).map_or(&[], Vec::as_slice)
    }

    /// Whether `channel_id` holds no messages.
    pub fn is_empty(&self, channel_id: ChannelId) -> bool {
        self.get(channel_id).is_empty()
    }

    /// Insert or replace `message` in its channel.
    ///
    /// New IDs are appended. Returns `true` if the ID was new.
    pub fn upsert(&mut self, message: Message) -> bool {
        let log = self.channels.entry(message.channel_id).or_default();

        if let Some(held) = log.iter_mut().find(|m| m.id == message.id) {
            *held = message;
            false
        } else {
            log.push(message);
            true
        }
    }

    /// Store fetched history for `channel_id`.
    ///
    /// History comes first in server order. Messages already held (delivered
    /// while the fetch was in flight) follow if the history does not contain
    /// them.
    pub fn merge_history(&mut self, channel_id: ChannelId, history: Vec<Message>) {
        let held = self.channels.remove(&channel_id).unwrap_or_default();

        let mut merged: Vec<Message> = Vec::with_capacity(history.len() + held.len());
        let history = history.into_iter().filter(|m| m.channel_id == channel_id);
        for message in history.chain(held) {
            if !merged.iter().any(|m| m.id == message.id) {
                merged.push(message);
            }
        }

        debug_assert!(merged.iter().all(|m| m.channel_id == channel_id));
        self.channels.insert(channel_id, merged);
    }

    /// Keep only the entries whose channel satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(ChannelId) -> bool) {
        self.channels.retain(|id, _| keep(*id));
    }

    /// Channel IDs with an entry.
    pub fn channel_ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.channels.keys().copied()
    }

    /// Total number of held messages.
    pub fn total(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    /// Whether no channel has an entry.
    pub fn is_cleared(&self) -> bool {
        self.channels.is_empty()
    }
}
