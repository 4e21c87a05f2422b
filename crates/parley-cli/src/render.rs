//! Plain-text rendering of mirror entities.

use parley_core::{Channel, Message, User};

/// Human-readable channel name.
///
/// Direct channels show the other participant; named channels show their
/// name.
pub fn channel_label(channel: &Channel, recipient: Option<&User>) -> String {
    if channel.kind.is_single() {
        return match recipient {
            Some(user) => format!("@{}", user.display_name),
            None => format!("@unknown ({})", channel.id),
        };
    }
    match &channel.name {
        Some(name) => format!("#{name}"),
        None => format!("#{}", channel.id),
    }
}

/// One line per message: time, sender, content and attachment count.
pub fn message_line(message: &Message, sender: Option<&User>) -> String {
    let time = message.created_at.format("%Y-%m-%d %H:%M");
    let who =
        sender.map_or_else(|| format!("user {}", message.sender_id), |u| u.display_name.clone());

    let mut line = format!("[{time}] {who}: {}", message.content);
    if !message.files.is_empty() {
        line.push_str(&format!(" (+{} files)", message.files.len()));
    }
    line
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{TimeZone, Utc};
    use parley_core::ChannelKind;

    use super::*;

    fn bob() -> User {
        User {
            id: 43,
            display_name: "Bob".into(),
            email: String::new(),
            workspace_id: 7,
            workspace_name: None,
        }
    }

    fn channel(kind: ChannelKind, name: Option<&str>) -> Channel {
        Channel { id: 3, kind, name: name.map(Into::into), members: BTreeSet::from([42, 43]) }
    }

    #[test]
    fn direct_channel_shows_recipient() {
        let direct = channel(ChannelKind::Single, None);
        assert_eq!(channel_label(&direct, Some(&bob())), "@Bob");
        assert_eq!(channel_label(&direct, None), "@unknown (3)");
    }

    #[test]
    fn named_channel_shows_name() {
        assert_eq!(channel_label(&channel(ChannelKind::PublicChannel, Some("ops")), None), "#ops");
        assert_eq!(channel_label(&channel(ChannelKind::Group, None), None), "#3");
    }

    #[test]
    fn message_line_names_sender() {
        let message = Message {
            id: 1,
            channel_id: 3,
            sender_id: 43,
            content: "hi".into(),
            files: vec!["https://files/a.png".into()],
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single().unwrap_or_default(),
        };

        assert_eq!(message_line(&message, Some(&bob())), "[2024-05-01 10:00] Bob: hi (+1 files)");
        assert!(message_line(&message, None).contains("user 43: hi"));
    }
}
