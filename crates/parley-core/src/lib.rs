//! Core types for the Parley mirror engine.
//!
//! Pure data and decoding logic shared by every other crate: the entities the
//! engine mirrors ([`User`], [`Workspace`], [`Channel`], [`Message`]), session
//! token decoding ([`TokenDecoder`]), push-stream payload decoding, and the
//! error taxonomy reported by remote collaborators.
//!
//! No I/O happens here. Transport lives in `parley-remote`, persistence in
//! `parley-store`, and orchestration in `parley-app`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod model;
pub mod push;
pub mod token;

pub use error::{FailureKind, RemoteError, TokenError};
pub use model::{
    Channel, ChannelId, ChannelKind, Credentials, Message, MessageId, OutgoingMessage, Registration,
    Token, User, UserId, Workspace, WorkspaceId,
};
pub use push::{NEW_MESSAGE_EVENT, PushFrame, decode_new_message};
pub use token::{SessionIdentity, TokenDecoder, TokenPolicy};
