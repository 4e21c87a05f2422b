//! Command-line front end for the Parley mirror engine.
//!
//! Each invocation restores the mirror from the durable cache, runs one
//! command against it and exits. Commands that change server-side state
//! (sign-in, send, refresh) write through to the cache, so the next
//! invocation starts from where this one left off.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod args;
mod commands;
mod error;
mod render;
mod setup;

pub use args::{Args, Command};
pub use commands::run;
pub use error::CliError;
pub use render::{channel_label, message_line};
pub use setup::{CliEngine, open_engine};
