use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::cache::LocationCache;
use crate::config::MemoryConfig;
use crate::errors::Result;

#[derive(Clone)]
struct CachedValue {
    data: String,
    ttl: Duration,
}

/// 按写入时给定的 TTL 过期，覆盖写入时重新计时
struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// 进程内缓存，单节点部署或本地开发使用
pub struct MokaLocationCache {
    inner: Cache<String, CachedValue>,
}

impl MokaLocationCache {
    pub fn new(config: &MemoryConfig) -> Self {
        let mut builder = Cache::<String, CachedValue>::builder().expire_after(PerEntryExpiry);
        if let Some(capacity) = config.max_capacity {
            builder = builder.max_capacity(capacity);
        }
        let inner = builder.build();

        match config.max_capacity {
            Some(capacity) => {
                debug!("MokaLocationCache initialized with max capacity: {}", capacity)
            }
            None => debug!("MokaLocationCache initialized without capacity limit"),
        }
        Self { inner }
    }
}

#[async_trait]
impl LocationCache for MokaLocationCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.inner.get(key).await.map(|v| v.data);
        trace!("Memory cache {} for key: {}", if value.is_some() { "hit" } else { "miss" }, key);
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.inner
            .insert(key.to_string(), CachedValue { data: value, ttl })
            .await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
