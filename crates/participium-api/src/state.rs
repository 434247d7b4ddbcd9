//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`, instead of threading a single god object
//! through every signature.

use std::sync::Arc;

use participium_core::Config;
use participium_db::{OfficerRepository, PhotoRepository, ReportRepository, TelegramRepository};
use sqlx::PgPool;

use crate::services::UploadService;

// ----- Sub-state types -----

/// Database pool and all repositories.
#[derive(Clone)]
#[allow(dead_code)] // pool is held for handlers that need raw queries; repositories cover the rest
pub struct DbState {
    pub pool: PgPool,
    pub photo_repository: PhotoRepository,
    pub report_repository: ReportRepository,
    pub officer_repository: OfficerRepository,
    pub telegram_repository: TelegramRepository,
}

/// Upload orchestration and its limits.
#[derive(Clone)]
pub struct UploadState {
    pub service: UploadService,
    pub max_upload_size: i64,
}

/// Inbound security configuration (webhook secret, CORS).
#[derive(Clone)]
pub struct SecurityConfig {
    pub telegram_webhook_secret: Option<String>,
    pub cors_origins: Vec<String>,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
#[allow(dead_code)] // config and is_production ride along for handlers that need them
pub struct AppState {
    pub db: DbState,
    pub uploads: UploadState,
    pub security: SecurityConfig,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for UploadState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.uploads.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for SecurityConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.security.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
