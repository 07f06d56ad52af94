//! 缓存层
//!
//! `LocationCache` 是唯一的抽象；后端由 `cache.type` 选择：
//! - `redis`: 生产环境，多实例共享
//! - `memory`: 进程内 moka 缓存

pub mod object_cache;
pub mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::{CacheConfig, CacheType};
use crate::errors::Result;

pub use object_cache::{MokaLocationCache, RedisLocationCache};
pub use traits::LocationCache;

/// 根据配置创建缓存后端
pub fn create_cache(config: &CacheConfig) -> Result<Arc<dyn LocationCache>> {
    let cache: Arc<dyn LocationCache> = match CacheType::parse(&config.cache_type)? {
        CacheType::Redis => Arc::new(RedisLocationCache::new(&config.redis)?),
        CacheType::Memory => Arc::new(MokaLocationCache::new(&config.memory)),
    };

    info!(
        "Using cache backend: {} (TTL {}s)",
        cache.name(),
        config.ttl_secs
    );
    Ok(cache)
}
