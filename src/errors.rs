use std::fmt;

/// 查询链路上的全部错误类型
///
/// `message()` 原样返回给调用方，放进 `{"error": "..."}`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocatorError {
    Validation(String),
    Transport(String),
    Provider(String),
    Parse(String),
    Cache(String),
    Config(String),
}

impl GeolocatorError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeolocatorError::Validation(_) => "E001",
            GeolocatorError::Transport(_) => "E002",
            GeolocatorError::Provider(_) => "E003",
            GeolocatorError::Parse(_) => "E004",
            GeolocatorError::Cache(_) => "E005",
            GeolocatorError::Config(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeolocatorError::Validation(_) => "Validation Error",
            GeolocatorError::Transport(_) => "Transport Error",
            GeolocatorError::Provider(_) => "Provider Error",
            GeolocatorError::Parse(_) => "Parse Error",
            GeolocatorError::Cache(_) => "Cache Error",
            GeolocatorError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeolocatorError::Validation(msg)
            | GeolocatorError::Transport(msg)
            | GeolocatorError::Provider(msg)
            | GeolocatorError::Parse(msg)
            | GeolocatorError::Cache(msg)
            | GeolocatorError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（启动失败时打印到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于日志）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeolocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeolocatorError {}

// 便捷的构造函数
impl GeolocatorError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Validation(msg.into())
    }

    pub fn transport<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Transport(msg.into())
    }

    pub fn provider<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Provider(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Parse(msg.into())
    }

    pub fn cache<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Cache(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Config(msg.into())
    }
}

impl From<serde_json::Error> for GeolocatorError {
    fn from(err: serde_json::Error) -> Self {
        GeolocatorError::Parse(err.to_string())
    }
}

impl From<redis::RedisError> for GeolocatorError {
    fn from(err: redis::RedisError) -> Self {
        GeolocatorError::Cache(err.to_string())
    }
}

impl From<ureq::Error> for GeolocatorError {
    fn from(err: ureq::Error) -> Self {
        GeolocatorError::Transport(err.to_string())
    }
}

impl From<config::ConfigError> for GeolocatorError {
    fn from(err: config::ConfigError) -> Self {
        GeolocatorError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeolocatorError>;
