use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lawdesk::config::AppConfig;
use lawdesk::database;
use lawdesk::web::{self, AppState};

#[tokio::main]
async fn main() {
    // .env is optional
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lawdesk=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    info!(database_url = %config.database_url, "connecting to database");
    let pool = database::connect(&config.database_url, config.database_max_connections).await?;

    let host = config.host.clone();
    let port = config.port;
    let app = web::router(AppState::new(pool, config));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback: SocketAddr = format!("{}:{}", host, port.saturating_add(1)).parse()?;
            warn!(%addr, %fallback, error = %e, "bind failed, trying fallback port");
            tokio::net::TcpListener::bind(fallback).await?
        }
    };

    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
    }
}
