use std::fmt;

/// A named unit of durable persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Signed-in user profile.
    User,
    /// Bearer token.
    Token,
    /// Workspace of the signed-in user.
    Workspace,
    /// Channel list.
    Channels,
    /// User directory.
    Users,
}

impl Slot {
    /// Every slot, in a stable order.
    pub const ALL: [Slot; 5] =
        [Slot::User, Slot::Token, Slot::Workspace, Slot::Channels, Slot::Users];

    /// Storage key for this slot.
    pub fn name(self) -> &'static str {
        match self {
            Slot::User => "user",
            Slot::Token => "token",
            Slot::Workspace => "workspace",
            Slot::Channels => "channels",
            Slot::Users => "users",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
