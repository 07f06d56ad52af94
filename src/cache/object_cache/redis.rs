use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult, aio::MultiplexedConnection};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cache::LocationCache;
use crate::config::RedisConfig;
use crate::errors::{GeolocatorError, Result};

pub struct RedisLocationCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
    /// 单条命令（含建连）的超时
    timeout: Duration,
}

impl RedisLocationCache {
    /// 创建客户端，不会立即建立连接
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.connection_url())?;

        debug!(
            "RedisLocationCache created for {} (db {}), prefix: '{}'",
            config.addr, config.db, config.key_prefix
        );

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: config.key_prefix.clone(),
            timeout: config.timeout(),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> RedisResult<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 在超时内执行一条命令；出错时丢弃连接，下次重连
    async fn run<T, F, Fut>(&self, op: &'static str, command: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let attempt = async {
            let conn = self.get_connection().await?;
            command(conn).await
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                self.reset_connection().await;
                Err(GeolocatorError::cache(format!("redis {} failed: {}", op, e)))
            }
            Err(_) => {
                self.reset_connection().await;
                Err(GeolocatorError::cache(format!(
                    "redis {} timed out after {:?}",
                    op, self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl LocationCache for RedisLocationCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let redis_key = self.make_key(key);

        let value: Option<String> = self
            .run("GET", |mut conn| async move { conn.get(redis_key).await })
            .await?;

        trace!(
            "Redis cache {} for key: {}",
            if value.is_some() { "hit" } else { "miss" },
            key
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let redis_key = self.make_key(key);
        let ttl_secs = ttl.as_secs().max(1);

        self.run("SET", |mut conn| async move {
            conn.set_ex::<String, String, ()>(redis_key, value, ttl_secs)
                .await
        })
        .await?;

        trace!("Successfully inserted key into cache: {}", key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let pong: String = self
            .run("PING", |mut conn| async move {
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;

        debug!("Redis connection test successful: {}", pong);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
