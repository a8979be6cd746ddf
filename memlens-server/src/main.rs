//! memlens Server
//!
//! JSON-RPC bridge that serves memory reads and local variable ranges to an
//! IDE debug extension. The extension owns the debug session; DAP requests
//! are relayed back to it over the same stdin/stdout stream.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use memlens_core::InspectorConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bridge;
mod handler;
mod host;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is for JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MEMLENS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("memlens-server starting...");

    let config = load_config()?;

    bridge::serve(tokio::io::stdin(), Box::new(tokio::io::stdout()), config).await?;

    info!("memlens-server shutting down");
    Ok(())
}

/// Config file from the first argument, else `MEMLENS_CONFIG`, else defaults
fn load_config() -> Result<InspectorConfig> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("MEMLENS_CONFIG").map(PathBuf::from));

    match path {
        Some(path) => {
            let config = InspectorConfig::load(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?;
            info!("Loaded config from {:?}", path);
            Ok(config)
        }
        None => Ok(InspectorConfig::default()),
    }
}
