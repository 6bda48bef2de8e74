//! Engine wiring shared by every subcommand.

use anyhow::Result;
use offgrid_client::{FetchClient, FetchConfig};
use offgrid_core::{AppConfig, CacheDb, Engine, GenerationManager};
use url::Url;

/// An engine over the configured cache database.
pub struct Context {
    pub engine: Engine<FetchClient>,
    pub origin: Url,
    pub manifest: Vec<Url>,
}

impl Context {
    /// Open the database at `config.db_path` and build the engine.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let db = CacheDb::open(&config.db_path).await?;
        Self::with_db(config, db).await
    }

    pub async fn with_db(config: &AppConfig, db: CacheDb) -> Result<Self> {
        let origin = config.origin_url()?;
        let manifest = config.precache_urls()?;
        let generations = GenerationManager::open(db, config.generation_names()).await?;
        let network = FetchClient::new(FetchConfig::from(config))?;
        let engine = Engine::new(network, config.classifier(), generations, &origin);
        Ok(Self { engine, origin, manifest })
    }
}
