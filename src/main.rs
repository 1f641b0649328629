//! Intent Pool Service
//!
//! Accepts signed intents over HTTP, keeps them in an in-memory pool and
//! clears compatible pairs on request (and optionally on a timer).
//!
//! ## Overview
//!
//! 1. Makers sign a canonical message describing their intent
//! 2. `POST /intents` rebuilds that message, recovers the signer and admits
//!    the intent if it matches the claimed maker
//! 3. `POST /solve` clears the first compatible pair in the pool
//! 4. `GET /matches` lists cleared pairs, most recent first

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use intent_pool::api::ApiServer;
use intent_pool::config::{Config, CONFIG_PATH_ENV};
use intent_pool::storage::{IntentPool, MatchHistory};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "intent-pool", about = "Signed intent pool and matching service")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<String>,

    /// Override api.host from the config file
    #[arg(long)]
    host: Option<String>,

    /// Override api.port from the config file
    #[arg(long)]
    port: Option<u16>,
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point that initializes and runs the service.
///
/// This function:
/// 1. Loads configuration from TOML file
/// 2. Initializes logging
/// 3. Creates the pool and history stores
/// 4. Starts the background solver if configured
/// 5. Runs the API server until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Intent Pool Service");
    info!("Configuration loaded successfully");

    // Process-wide stores, shared by handle with every request handler
    let pool = Arc::new(IntentPool::new());
    let history = Arc::new(MatchHistory::new());

    let api_server = ApiServer::new(config.clone(), pool, history);

    if let Some(interval) = config.solver.auto_solve_interval() {
        api_server.solver().spawn_auto_solve(interval);
    }

    // Run the service (this blocks until shutdown)
    api_server.run().await?;

    Ok(())
}
