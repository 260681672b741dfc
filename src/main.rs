// Tablemask - masked PostgreSQL table copies
// Copyright (c) 2025 Tablemask Contributors
// Licensed under the MIT License

use tablemask::cli::{Cli, Commands};
use tablemask::config::{load_config_or_default, LoggingConfig, TablemaskConfig};
use tablemask::logging::init_logging;
use clap::Parser;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            process::exit(5);
        }
    };

    process::exit(runtime.block_on(run(cli)));
}

async fn run(cli: Cli) -> i32 {
    let config = load_config_or_default(cli.config.as_deref());

    // Log level precedence: --log-level / TABLEMASK_LOG_LEVEL, then the config file
    let log_level = cli.log_level.clone().unwrap_or_else(|| match &config {
        Ok(c) => c.application.log_level.clone(),
        Err(_) => "info".to_string(),
    });
    let logging_config = match &config {
        Ok(c) => c.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };

    let _guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return cli.reject_startup(e);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Tablemask - masked PostgreSQL table copies"
    );

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return cli.reject_startup(e);
        }
    };

    match execute_command(&cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5
        }
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, config: TablemaskConfig) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(config).await,
        Commands::ValidatePolicy(args) => args.execute().await,
    }
}
