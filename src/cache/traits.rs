use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

/// 位置缓存存储
///
/// key 为原始 IP 字符串，value 为序列化后的 `LocationRecord`。
/// 每次 `set` 整体覆盖旧值并重置 TTL。
#[async_trait]
pub trait LocationCache: Send + Sync {
    /// 读取缓存
    /// - `Ok(None)`：未命中或已过期
    /// - `Err`：后端不可用，调用方按未命中处理
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// 连通性检查（启动时调用）
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// 获取后端名称（用于日志）
    fn name(&self) -> &'static str;
}
