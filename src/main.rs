use clap::Parser;

use geolocator::cli::{Cli, Commands, ConfigCommands};
use geolocator::config::StaticConfig;
use geolocator::errors::GeolocatorError;
use geolocator::runtime::modes::run_server;
use geolocator::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.generate_config {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    if let Some(Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    }) = cli.command
    {
        match output_path {
            Some(path) => {
                if let Err(e) = StaticConfig::write_sample_config(&path, force) {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
                println!("Sample configuration written to {}", path);
            }
            None => println!("{}", StaticConfig::generate_sample_config()),
        }
        return Ok(());
    }

    let config = StaticConfig::load(cli.config.as_deref());

    // 必须在整个进程生命周期内持有，确保日志刷盘
    let _log_guard = init_logging(&config.logging);

    if let Err(e) = run_server(config).await {
        match e.downcast_ref::<GeolocatorError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("[ERROR] {:#}", e),
        }
        return Err(e);
    }

    Ok(())
}
