//! Application setup and initialization
//!
//! All initialization logic lives here instead of main.rs so each stage can
//! fail with context and be exercised independently.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use participium_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Setup database
    let pool = database::setup_database(&config).await?;

    // Initialize storage, repositories, and services
    let state = services::initialize_services(&config, pool).await?;

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
