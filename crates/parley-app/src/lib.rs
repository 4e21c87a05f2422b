//! Local mirror synchronization engine for the Parley chat client.
//!
//! Keeps an in-memory mirror of the chat service (session, workspace,
//! channels, user directory, per-channel history), persists the durable part
//! of it, and reconciles local sends with the server-push stream.
//!
//! # Components
//!
//! - [`Mirror`]: pure state machine (events in, actions out)
//! - [`Engine`]: runtime that performs remote calls and executes actions
//! - [`LiveChannel`]: the single push connection
//! - [`EngineConfig`]: TOML configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod config;
mod directory;
mod engine;
mod error;
mod event;
mod live;
mod messages;
mod mirror;
mod session;
mod state;

pub use action::MirrorAction;
pub use config::{EngineConfig, PolicyKind, StorageConfig, TokenConfig};
pub use directory::Directory;
pub use engine::Engine;
pub use error::{ConfigError, MirrorError};
pub use event::MirrorEvent;
pub use live::{LiveChannel, LiveUpdate};
pub use messages::MessageStore;
pub use mirror::Mirror;
pub use session::SessionStore;
pub use state::{DirectChannel, LiveState, SessionCredentials};
