//! Engine construction from configuration.

use parley_app::{Engine, EngineConfig};
use parley_remote::{HttpRemote, SsePushSource};
use parley_store::RedbSlotStore;
use tracing::debug;

use crate::CliError;

/// Engine over the HTTP, SSE and redb adapters.
pub type CliEngine = Engine<HttpRemote, RedbSlotStore, SsePushSource>;

/// Build the adapters `config` describes and restore the mirror.
///
/// The token settings are checked before the durable cache is opened.
pub fn open_engine(config: &EngineConfig) -> Result<CliEngine, CliError> {
    let decoder = config.token.decoder()?;

    let store_path = config.storage.resolved_path();
    if let Some(dir) = store_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    debug!(path = %store_path.display(), "opening local mirror");
    let store = RedbSlotStore::open(&store_path)?;

    let remote = HttpRemote::new(config.server.clone())?;
    let push = SsePushSource::new(&config.server)?;

    let mut engine = Engine::new(remote, store, push, decoder);
    engine.restore();
    Ok(engine)
}
