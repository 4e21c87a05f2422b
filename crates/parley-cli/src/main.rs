//! Parley command-line client.
//!
//! # Usage
//!
//! ```bash
//! parley signin --email ada@acme.io          # password from PARLEY_PASSWORD
//! parley channels
//! parley history 3
//! parley send 3 hello there
//! parley watch --channel 3
//! parley signout
//! ```

use std::io;

use clap::Parser;
use parley_cli::{Args, CliError, open_engine, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let mut engine = open_engine(&args.load_config())?;

    let mut stdout = io::stdout().lock();
    tokio::select! {
        result = run(&mut engine, args.command, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
    }

    Ok(())
}
