//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Geolocator - IP geolocation gateway backed by ipstack
#[derive(Parser, Debug)]
#[command(name = "geolocator")]
#[command(version)]
#[command(about = "IP geolocation gateway backed by ipstack", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Print a sample configuration to stdout and exit
    #[arg(long)]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands（不带子命令时启动 HTTP 服务）
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: stdout)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
