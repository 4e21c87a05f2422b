//! CLI errors.

use parley_app::{ConfigError, MirrorError};
use parley_core::RemoteError;
use parley_store::StorageError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Engine intent failed.
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// Remote adapters could not be built.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Durable cache could not be opened.
    #[error("cannot open local mirror: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Local file access or writing output failed.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}
