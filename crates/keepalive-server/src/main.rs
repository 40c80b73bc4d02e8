//! Keepalive server binary

use anyhow::Context;
use keepalive_server::{Config, KeepaliveServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (needed for logging settings)
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Can't use tracing yet - not initialized
            eprintln!("Configuration error: {}", e);
            eprintln!("Using default configuration");
            let mut cfg = Config::default();
            cfg.apply_env_overrides();
            cfg
        }
    };

    let level = config.logging.level.as_deref().unwrap_or("info");
    match config.logging.format.as_deref() {
        Some("text") => common::logging::init_with_level(level, false),
        _ => common::logging::init_with_level(level, true),
    }

    tracing::info!("Keepalive server starting");

    let server_config = config.to_server_config();
    let server = KeepaliveServer::new(server_config);

    server.run().await.context("server exited with error")?;

    Ok(())
}
