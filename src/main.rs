//! uaforge CLI entry point.

use clap::Parser;
use tracing::warn;

use uaforge::cli::{commands, handle_error, Cli, Commands};
use uaforge::infrastructure::config::ConfigLoader;
use uaforge::infrastructure::logging::{prune_old_logs, LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let log_config = LogConfig::from(&config.logging);
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };
    if let Some(log_dir) = &log_config.log_dir {
        if let Err(err) = prune_old_logs(log_dir, log_config.retention_days).await {
            warn!(error = %err, "log retention cleanup failed");
        }
    }

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Generate(args) => commands::generate::execute(args, &config, cli.json).await,
        Commands::Pools(args) => commands::pools::execute(args, &config, cli.json).await,
        Commands::Blacklist(args) => commands::blacklist::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
