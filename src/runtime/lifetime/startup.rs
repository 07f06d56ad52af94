use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::cache::{self, LocationCache};
use crate::config::StaticConfig;
use crate::services::{GeoProvider, IpstackProvider, LookupService};

pub struct StartupContext {
    pub cache: Arc<dyn LocationCache>,
    pub provider: Arc<dyn GeoProvider>,
    pub lookup_service: Arc<LookupService>,
}

/// 准备服务器启动的上下文
///
/// 缓存不可达不会中止启动：查询会退化为直连 provider，直到缓存恢复。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let cache = cache::create_cache(&config.cache).context("Failed to create cache backend")?;

    match cache.ping().await {
        Ok(()) => info!("Cache backend '{}' is reachable", cache.name()),
        Err(e) => error!(
            "Cache backend '{}' is unreachable: {}. Lookups will bypass the cache until it recovers",
            cache.name(),
            e
        ),
    }

    let provider: Arc<dyn GeoProvider> = Arc::new(IpstackProvider::new(&config.provider));
    info!(
        "Geolocation provider: {} ({})",
        provider.name(),
        config.provider.base_url
    );

    let lookup_service = Arc::new(LookupService::new(
        cache.clone(),
        provider.clone(),
        config.cache.ttl(),
    ));

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        cache,
        provider,
        lookup_service,
    })
}
