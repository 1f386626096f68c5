// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! Tiny-SQL server entry point

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tinysql_common::ServerConfig;
use tinysql_protocol::TinySqlServer;
use tinysql_storage::StorageEngine;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tinysql", version, about = "A wire-compatible MySQL server")]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = 3306)]
    port: u16,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Starting Tiny-SQL server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(args.config.as_deref())?;
    config.port = args.port;
    config.validate()?;
    info!("Listening address: {}", config.listen_addr());

    let engine = Arc::new(StorageEngine::new());

    let server = TinySqlServer::new(engine, config);
    tokio::spawn(async move {
        if let Err(e) = server.start().await {
            tracing::error!("MySQL server error: {}", e);
        }
    });

    info!("Tiny-SQL server is ready to serve");

    wait_for_shutdown().await;

    info!("Tiny-SQL server shut down");
    Ok(())
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) if path.exists() => {
            let config = ServerConfig::from_file(path)?;
            info!("Configuration loaded from {:?}", path);
            Ok(config)
        }
        Some(path) => {
            warn!("Config file not found: {:?}, using defaults", path);
            Ok(ServerConfig::default())
        }
        None => Ok(ServerConfig::default()),
    }
}

/// Wait for SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
