//! siemtop_demo entry point: serve generated SIEM events over HTTP.

use std::{env, net::SocketAddr};

use chrono::Utc;
use siemtop_demo::{config::DEFAULT_PORT, parse_port, router, AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if env::args().any(|a| a == "-h" || a == "--help") {
        println!("Usage: siemtop_demo [--port N|-p N]");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let port = parse_port(env::args(), DEFAULT_PORT);
    let config = Config::from_env();
    let state = AppState::new(&config, Utc::now());
    info!(events = state.events.len(), user = %config.user, "generated sample events");

    let app = router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("SIEM demo API listening on http://{addr}/api");
    axum::serve(listener, app).await?;
    Ok(())
}
