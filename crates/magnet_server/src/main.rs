//! Magnet Arena - WebSocket game server

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magnet_core::config::GameConfig;
use magnet_server::connection::handle_connection;
use magnet_server::registry::Registry;
use magnet_server::ServerConfig;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Magnet Arena server");

    let config = ServerConfig::from_env();
    let registry = Arc::new(Registry::new(GameConfig::default()));

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Listening on port {}", config.port);

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                tracing::warn!(%err, "accept failed");
                continue;
            }
        };
        tokio::spawn(handle_connection(
            registry.clone(),
            config.clone(),
            stream,
            addr.to_string(),
        ));
    }
}
