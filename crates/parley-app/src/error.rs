//! Errors surfaced to the calling application.

use parley_core::{ChannelId, FailureKind, RemoteError};
use parley_store::StorageError;
use thiserror::Error;

/// Errors from engine intents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// Sign-in failed; nothing was committed.
    #[error("sign-in failed: {0}")]
    SignInFailed(#[source] RemoteError),

    /// Sign-up failed; nothing was committed.
    #[error("sign-up failed: {0}")]
    SignUpFailed(#[source] RemoteError),

    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The intent needs a session.
    #[error("not signed in")]
    NotAuthenticated,

    /// The channel is not in the channel list.
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    /// Writing the durable cache failed. In-memory state is already updated.
    #[error("durable cache: {0}")]
    Storage(#[from] StorageError),

    /// The live connection could not be opened.
    #[error("live channel: {0}")]
    Live(#[source] RemoteError),
}

impl MirrorError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SignInFailed(e) | Self::SignUpFailed(e) | Self::Remote(e) | Self::Live(e) => {
                e.kind()
            },
            Self::NotAuthenticated => FailureKind::NotAuthenticated,
            Self::UnknownChannel(_) => FailureKind::Rejected,
            Self::Storage(_) => FailureKind::Storage,
        }
    }
}

/// Errors from loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {message}")]
    Read {
        /// Configuration file path.
        path: String,
        /// OS error.
        message: String,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// Token verification settings are incomplete or unusable.
    #[error("invalid token settings: {0}")]
    Token(String),
}
