//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_app::EngineConfig;
use parley_core::ChannelId;

/// File name of the durable cache inside `--data-dir`.
const STORE_FILE: &str = "mirror.redb";

/// Parley chat client
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Chat client keeping a local mirror of your workspace")]
#[command(version)]
pub struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the durable cache (overrides the configuration)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Configuration file to read.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(EngineConfig::default_path)
    }

    /// Load the configuration and apply command-line overrides.
    pub fn load_config(&self) -> EngineConfig {
        let mut config = EngineConfig::load_or_default(&self.config_path());
        if let Some(dir) = &self.data_dir {
            config.storage.path = Some(dir.join(STORE_FILE));
        }
        config
    }
}

/// Commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in with email and password
    Signin {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "PARLEY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Signup {
        /// Workspace to create or join
        #[arg(long)]
        workspace: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "PARLEY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in user and workspace
    Whoami,

    /// List channels
    Channels,

    /// List the workspace directory
    Users,

    /// Pull the directory and channel list again
    Refresh,

    /// Show a channel's history
    History {
        /// Channel ID
        channel: ChannelId,
    },

    /// Send a message
    Send {
        /// Channel ID
        channel: ChannelId,
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Stream new messages until the connection closes
    Watch {
        /// Only show messages of this channel
        #[arg(long)]
        channel: Option<ChannelId>,
    },

    /// Sign out and erase the local mirror
    Signout,
}
