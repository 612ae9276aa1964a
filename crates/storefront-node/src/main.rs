//! Storefront Node - in-memory product catalog server.
//!
//! This is the main entry point for running a Storefront node.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use storefront_node::api::{create_router, AppState};
use storefront_node::config::NodeConfig;
use storefront_node::observability::{init_logging, LogFormat};
use tokio::net::TcpListener;

/// Storefront Node - in-memory product catalog server
#[derive(Parser, Debug)]
#[command(name = "storefront-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API listen address [default: 0.0.0.0:8080]
    #[arg(long)]
    api_addr: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error) [default: info]
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json) [default: pretty]
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Resolves the node configuration: file values first, flags on top.
    fn into_config(self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => NodeConfig::default(),
        };

        if let Some(api_addr) = self.api_addr {
            config.api_addr = api_addr;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;

    init_logging(&config.log_level, LogFormat::parse(&config.log_format));

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Storefront node");

    let state = AppState::seeded();
    tracing::info!(products = state.catalog.len(), "Catalog seeded");

    let listener = TcpListener::bind(config.api_addr)
        .await
        .with_context(|| format!("binding API listener on {}", config.api_addr))?;
    tracing::info!(api_addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving API")?;

    tracing::info!("Storefront node stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
