//! People Service Server
//!
//! Serves the people endpoint over HTTP until Ctrl+C or SIGTERM.
use std::net::SocketAddr;
use clap::{value_parser, Arg, Command};
use people_service_core::core::{config, factory::create_app_state, init_logging, Environment};
use people_service_core::{log_info, VERSION};
use people_service_server::{shutdown_signal, start_api_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("people-service")
        .version(VERSION)
        .about("People CRUD service")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .value_parser(value_parser!(SocketAddr))
                .help("HTTP bind address, e.g. 0.0.0.0:3000")
        )
        .arg(
            Arg::new("env")
                .long("env")
                .value_name("ENV")
                .value_parser(["development", "test", "production"])
                .help("Deployment environment")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Log level")
        )
        .get_matches();

    // Load configuration: file, then environment, then command line
    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(addr) = matches.get_one::<SocketAddr>("http-addr") {
        config.server.http_addr = *addr;
    }
    if let Some(env) = matches.get_one::<String>("env") {
        config.server.environment = env.parse::<Environment>()?;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }
    config.validate()?;

    // Initialize logging
    init_logging(&config.logging);

    match config_path {
        Some(path) => log_info!("Loaded configuration from: {}", path),
        None => log_info!("No config file specified, using defaults"),
    }

    log_info!(
        environment = ?config.server.environment,
        storage = %config.storage.storage_type,
        "Starting people service {}",
        VERSION
    );

    // Create AppState using factory pattern
    let app_state = create_app_state(config)?;
    log_info!("AppState created successfully");

    start_api_server(app_state, shutdown_signal()).await?;

    log_info!("Shutdown complete");
    Ok(())
}
