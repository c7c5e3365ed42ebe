//! `TaskList` server -- task API over a single JSON data file.
//!
//! # Usage
//!
//! ```bash
//! # Serve ./maindata.json on 0.0.0.0:5000
//! cargo run --bin tasklist-server
//!
//! # Custom address and data file
//! cargo run --bin tasklist-server -- --bind 127.0.0.1:8080 --data-file school.json
//!
//! # Start from an empty data set
//! cargo run --bin tasklist-server -- --reset-data
//! ```

use std::sync::Arc;

use clap::Parser;
use tasklist_server::api::{self, AppState};
use tasklist_server::config::{ServerCliArgs, ServerConfig};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        data_file = %config.data_file.display(),
        "starting tasklist server"
    );

    let state = Arc::new(AppState::new(config.data_file.clone()));

    if config.reset_data {
        if let Err(e) = state.store.reset().await {
            tracing::error!(error = %e, "failed to reset data file");
            std::process::exit(1);
        }
        tracing::info!("data file reset, all collections are empty");
    }

    match api::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
