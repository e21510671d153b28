use std::process::ExitCode;

use tracing::{error, info};

use rssy::{Config, Daemon, Database};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = rssy::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        rssy::logging::init_console_only(&config.logging.level);
    }

    info!("rssy - RSS aggregation daemon");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {}", config.database.path, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Database opened at {}", config.database.path);

    let daemon = match Daemon::new(config, db.clone()) {
        Ok(daemon) => daemon,
        Err(e) => {
            error!("Failed to start services: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let scheduler = daemon.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");

    scheduler.shutdown().await;
    db.close().await;
    ExitCode::SUCCESS
}
