//! 位置查询服务（cache-aside）
//!
//! 1. 读缓存，命中且能反序列化则直接返回（不刷新 TTL）
//! 2. 未命中、读失败或内容损坏时请求 provider
//! 3. provider 失败直接返回错误，不写缓存
//! 4. 成功后写缓存（失败只记日志），再返回结果

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::cache::LocationCache;
use crate::errors::Result;
use crate::services::geolocation::{GeoProvider, LocationRecord, parse_provider_body};

pub struct LookupService {
    cache: Arc<dyn LocationCache>,
    provider: Arc<dyn GeoProvider>,
    ttl: Duration,
}

impl LookupService {
    pub fn new(
        cache: Arc<dyn LocationCache>,
        provider: Arc<dyn GeoProvider>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            provider,
            ttl,
        }
    }

    /// 查询 IP 地理位置
    ///
    /// `ip` 原样作为缓存 key，调用方负责校验。
    pub async fn lookup(&self, ip: &str) -> Result<LocationRecord> {
        if let Some(record) = self.read_cached(ip).await {
            return Ok(record);
        }

        let body = self.provider.fetch(ip).await?;
        let record = parse_provider_body(&body).inspect_err(|e| {
            debug!("{} lookup for {} rejected: {}", self.provider.name(), ip, e);
        })?;

        self.write_cached(ip, &record).await;
        Ok(record)
    }

    async fn read_cached(&self, ip: &str) -> Option<LocationRecord> {
        match self.cache.get(ip).await {
            Ok(Some(data)) => match serde_json::from_str::<LocationRecord>(&data) {
                Ok(record) => {
                    trace!("Cache hit for {}", ip);
                    Some(record)
                }
                Err(e) => {
                    warn!("Corrupt cache entry for {}, treating as miss: {}", ip, e);
                    None
                }
            },
            Ok(None) => {
                debug!("Cache miss for {}, querying {}", ip, self.provider.name());
                None
            }
            Err(e) => {
                warn!("Cache read failed for {}, treating as miss: {}", ip, e);
                None
            }
        }
    }

    async fn write_cached(&self, ip: &str, record: &LocationRecord) {
        let data = match serde_json::to_string(record) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize location for {}: {}", ip, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(ip, data, self.ttl).await {
            warn!("Cache write failed for {} (ignored): {}", ip, e);
        }
    }
}
