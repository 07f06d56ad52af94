use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{GeolocatorError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 兼容旧部署的环境变量名
pub const ENV_IPSTACK_API_KEY: &str = "IPSTACK_API_KEY";
pub const ENV_REDIS_PASSWORD: &str = "REDIS_PASSWORD";
pub const ENV_REDIS_ADDR: &str = "REDIS_ADDR";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - provider: ipstack 地址与 access key
/// - cache: 缓存后端与 TTL
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：旧环境变量 > GEO__ 环境变量 > TOML > 默认值
    /// ENV 前缀：GEO，分隔符：__
    /// 示例：GEO__SERVER__PORT=9999
    ///
    /// 加载失败时打印错误并回退到默认值。
    pub fn load(path: Option<&str>) -> Self {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let mut config = match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// 严格加载：TOML 或环境变量格式错误时返回错误
    pub fn try_load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 GEO，分隔符 __
            .add_source(
                Environment::with_prefix("GEO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 应用旧部署使用的环境变量
    ///
    /// `lookup` 便于测试时替换真实环境。空字符串视为未设置。
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = non_empty(ENV_IPSTACK_API_KEY) {
            self.provider.access_key = key;
        }
        if let Some(password) = non_empty(ENV_REDIS_PASSWORD) {
            self.cache.redis.password = password;
        }
        if let Some(addr) = non_empty(ENV_REDIS_ADDR) {
            self.cache.redis.addr = addr;
        }
    }

    /// 基本合法性检查
    pub fn validate(&self) -> Result<()> {
        if self.provider.base_url.is_empty() {
            return Err(GeolocatorError::config("provider.base_url must not be empty"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(GeolocatorError::config("cache.ttl_secs must be positive"));
        }
        CacheType::parse(&self.cache.cache_type)?;
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 将示例配置写入文件，已存在时需要 `force`
    pub fn write_sample_config(path: &str, force: bool) -> Result<()> {
        if std::path::Path::new(path).exists() && !force {
            return Err(GeolocatorError::config(format!(
                "{} already exists, use --force to overwrite",
                path
            )));
        }

        std::fs::write(path, Self::generate_sample_config()).map_err(|e| {
            GeolocatorError::config(format!("Failed to write {}: {}", path, e))
        })
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// ipstack 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// 请求地址为 `{base_url}{ip}?access_key={access_key}`
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 缓存后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheType {
    Redis,
    Memory,
}

impl CacheType {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(GeolocatorError::config(format!(
                "Invalid cache type: '{}'. Valid: redis, memory",
                s
            ))),
        }
    }
}

/// 缓存系统配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedisConfig {
    #[serde(default = "default_redis_addr")]
    pub addr: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub db: i64,
    /// 为空时 key 即原始 IP 字符串
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_redis_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    /// 拼出 redis:// 连接串，密码做 URL 编码
    pub fn connection_url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}/{}", self.addr, self.db)
        } else {
            format!(
                "redis://:{}@{}/{}",
                urlencoding::encode(&self.password),
                self.addr,
                self.db
            )
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MemoryConfig {
    /// 条目数上限；未设置时只按 TTL 过期
    #[serde(default)]
    pub max_capacity: Option<u64>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_provider_base_url() -> String {
    "http://api.ipstack.com/".to_string()
}

fn default_provider_timeout() -> u64 {
    5
}

fn default_cache_type() -> String {
    "redis".to_string()
}

fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

fn default_redis_addr() -> String {
    "127.0.0.1:6379".to_string()
}

fn default_redis_timeout() -> u64 {
    2
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            access_key: String::new(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            ttl_secs: default_cache_ttl(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: default_redis_addr(),
            password: String::new(),
            db: 0,
            key_prefix: String::new(),
            timeout_secs: default_redis_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
