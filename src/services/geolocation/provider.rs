//! Geolocation Provider 抽象层
//!
//! 只负责一次出站请求并返回原始响应体，解析交给 `response` 模块。

use async_trait::async_trait;

use crate::errors::Result;

/// 外部地理位置服务
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// 查询单个 IP，返回 HTTP 200 时的原始响应体
    ///
    /// 网络错误或非 200 状态返回 `Transport` 错误。
    async fn fetch(&self, ip: &str) -> Result<String>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}
