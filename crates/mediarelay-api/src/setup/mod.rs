//! Application setup and initialization
//!
//! Everything main.rs needs to go from a `Config` to a served router.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediarelay_backend::create_backend;
use mediarelay_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let backend = create_backend(&config).context("Failed to create messaging backend")?;

    // Startup check only; the server still starts when the backend is unreachable.
    match backend.get_me().await {
        Ok(identity) => tracing::info!(identity = %identity, "Backend session ready"),
        Err(e) => tracing::warn!(error = %e, "Could not verify backend identity at startup"),
    }

    let state = services::initialize_services(&config, backend).await?;

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
