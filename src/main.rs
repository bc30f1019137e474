use std::sync::Arc;

use anyhow::Result;
use clima::config::CacheBackend;
use clima::{
    AppConfig, CacheStore, MemoryCache, OpenMeteoEndpoints, PersistentCache, ReqwestClient,
    WeatherLookup, logging, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.logging)?;

    let cache: Arc<dyn CacheStore> = match config.cache.backend {
        CacheBackend::Persistent => {
            tracing::info!("Opening weather cache at {}", config.cache.location);
            Arc::new(PersistentCache::open(&config.cache.location)?)
        }
        CacheBackend::Memory => Arc::new(MemoryCache::with_capacity(config.cache.max_entries)),
    };
    let http = Arc::new(ReqwestClient::new(config.upstream.timeout())?);

    let lookup = WeatherLookup::new(cache, http, OpenMeteoEndpoints::from(&config.upstream))
        .with_cache_ttl(config.cache.ttl());

    web::run(&config.server.host, config.server.port, Arc::new(lookup)).await
}
