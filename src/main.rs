use clap::Parser;
use mosaic::cli::{commands, Cli, Commands};
use mosaic::config::MosaicConfig;
use mosaic::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match MosaicConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "mosaic starting");

    let result = match &cli.command {
        Commands::Analyze(args) => commands::analyze(args, &config),
        Commands::Anonymize(args) => commands::anonymize(args, &config).await,
        Commands::Entities(args) => commands::entities(args, &config),
        Commands::Operators => commands::operators(&config),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            1
        }
    };

    process::exit(exit_code);
}
