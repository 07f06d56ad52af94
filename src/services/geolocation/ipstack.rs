//! ipstack API 实现
//!
//! 请求格式：`GET {base_url}{ip}?access_key={key}`
//! ureq 是同步客户端，放到 spawn_blocking 中执行，避免阻塞 actix worker。

use async_trait::async_trait;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::GeoProvider;
use crate::config::ProviderConfig;
use crate::errors::{GeolocatorError, Result};

/// 非 200 响应时返回给调用方的消息
pub(crate) const INVALID_RESPONSE_MESSAGE: &str = "invalid response obtained from ipstack api";

/// ipstack Provider
///
/// Agent 内部带连接池，可跨线程克隆使用。
pub struct IpstackProvider {
    agent: Agent,
    base_url: String,
    access_key: String,
}

impl IpstackProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build()
            .into();

        if config.access_key.is_empty() {
            warn!("ipstack access key is empty, every lookup will be rejected by the provider");
        }

        Self {
            agent,
            base_url: config.base_url.clone(),
            access_key: config.access_key.clone(),
        }
    }

    fn request_url(&self, ip: &str) -> String {
        format!(
            "{}{}?access_key={}",
            self.base_url,
            ip,
            urlencoding::encode(&self.access_key)
        )
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn fetch_sync(agent: Agent, url: String, log_target: String) -> Result<String> {
        let mut resp = agent.get(&url).call().map_err(|e| {
            warn!("ipstack request to \"{}\" failed: {}", log_target, e);
            GeolocatorError::from(e)
        })?;

        let status = resp.status().as_u16();
        if status != 200 {
            warn!("ipstack returned HTTP {} for \"{}\"", status, log_target);
            return Err(GeolocatorError::transport(INVALID_RESPONSE_MESSAGE));
        }

        let body = resp.body_mut().read_to_string().map_err(|e| {
            warn!("ipstack response body from \"{}\" unreadable: {}", log_target, e);
            GeolocatorError::from(e)
        })?;

        trace!("ipstack returned {} bytes for \"{}\"", body.len(), log_target);
        Ok(body)
    }
}

#[async_trait]
impl GeoProvider for IpstackProvider {
    async fn fetch(&self, ip: &str) -> Result<String> {
        let agent = self.agent.clone();
        let url = self.request_url(ip);
        // 日志里不带 access_key
        let log_target = format!("{}{}", self.base_url, ip);

        tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url, log_target))
            .await
            .map_err(|e| {
                warn!("ipstack spawn_blocking failed: {}", e);
                GeolocatorError::transport(e.to_string())
            })?
    }

    fn name(&self) -> &'static str {
        "ipstack"
    }
}
