use std::path::PathBuf;

use anyhow::Context;
use cardio_api::{load_api_config, prepare_database, serve, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional first argument: path to a TOML config file
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_api_config(config_path.as_deref())
        .context("Failed to load API configuration")?;

    prepare_database(&config).context("Failed to prepare database")?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    serve(listener, AppState::from_config(&config), shutdown_signal())
        .await
        .context("API server failed")?;

    info!("API server stopped");
    Ok(())
}
