//! HTTP server for the settlement engine.
//!
//! `SETTLEMENT_CONFIG_DIR` selects the configuration directory (default
//! `./config/default`) and `SETTLEMENT_BIND` the listen address (default
//! `0.0.0.0:3000`).

use std::env;
use std::process::ExitCode;

use settlement_engine::api::{AppState, create_router};
use settlement_engine::config::ConfigLoader;
use settlement_engine::logging;
use tracing::{error, info};

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let config_dir =
        env::var("SETTLEMENT_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind = env::var("SETTLEMENT_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let loader = match ConfigLoader::load(&config_dir) {
        Ok(loader) => loader,
        Err(err) => {
            error!(config_dir = %config_dir, error = %err, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        config_dir = %config_dir,
        employees = loader.reference().active_employees().count(),
        "Configuration loaded"
    );

    let router = create_router(AppState::from_config(loader));
    let listener = match tokio::net::TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(bind = %bind, error = %err, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    info!(bind = %bind, "Settlement engine listening");
    if let Err(err) = axum::serve(listener, router).await {
        error!(error = %err, "Server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
