//! Logging system initialization
//!
//! This module provides functions to initialize the tracing/logging system
//! based on application configuration.

use tracing_appender::rolling;

use crate::config::LoggingConfig;

const DEFAULT_LOG_FILE_NAME: &str = "geolocator.log";

/// Initialize logging system based on configuration
///
/// **Note**: This should be called only once during application startup,
/// after the configuration has been loaded.
///
/// # Returns
/// * `WorkerGuard` - Must be kept alive for the duration of the program
///   to ensure non-blocking log writes are flushed
///
/// # Panics
/// * If setting the global subscriber fails (e.g., already initialized)
pub fn init_logging(config: &LoggingConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let writer = build_writer(config);

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // 输出调用位置（文件:行号）
    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(writes_to_console(config));

    if config.format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    guard
}

fn writes_to_console(config: &LoggingConfig) -> bool {
    config.file.as_ref().is_none_or(|f| f.is_empty())
}

/// 根据配置选择输出目标：滚动文件、追加文件或 stdout
///
/// 文件打开失败时回退到 stdout。
fn build_writer(config: &LoggingConfig) -> Box<dyn std::io::Write + Send + Sync> {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return Box::new(std::io::stdout());
    };

    if config.enable_rotation {
        let path = std::path::Path::new(log_file);
        let dir = path.parent().unwrap_or(std::path::Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_FILE_NAME);

        match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups as usize)
            .build(dir)
        {
            Ok(appender) => Box::new(appender),
            Err(e) => {
                eprintln!("[ERROR] Failed to create rolling log appender: {}", e);
                Box::new(std::io::stdout())
            }
        }
    } else {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
        {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("[ERROR] Failed to open log file {}: {}", log_file, e);
                Box::new(std::io::stdout())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_console_detection() {
        let mut config = LoggingConfig::default();
        assert!(writes_to_console(&config));

        config.file = Some(String::new());
        assert!(writes_to_console(&config));

        config.file = Some("/tmp/geolocator.log".to_string());
        assert!(!writes_to_console(&config));
    }

    #[test]
    fn test_build_writer_appends_to_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.log");
        let config = LoggingConfig {
            file: Some(path.to_string_lossy().to_string()),
            enable_rotation: false,
            ..Default::default()
        };

        let mut writer = build_writer(&config);
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
