//! Repository, storage, and service initialization.

use std::sync::Arc;

use anyhow::{Context, Result};
use participium_core::Config;
use participium_db::{OfficerRepository, PhotoRepository, ReportRepository, TelegramRepository};
use participium_storage::{LocalStorage, Storage};
use sqlx::PgPool;

use crate::services::{CleanupService, UploadService};
use crate::state::{AppState, DbState, SecurityConfig, UploadState};

/// Wire up storage, repositories, and services into the application state.
/// Also starts the abandoned-upload sweeper unless the interval is zero.
pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.upload_dir.clone(), config.upload_base_url.clone())
            .await
            .context("Failed to initialize photo storage")?,
    );

    let photo_repository = PhotoRepository::new(pool.clone());
    let report_repository = ReportRepository::new(pool.clone());
    let officer_repository = OfficerRepository::new(pool.clone());
    let telegram_repository = TelegramRepository::new(pool.clone());

    let max_upload_size = config.max_upload_size_bytes as i64;
    let upload_service =
        UploadService::new(photo_repository.clone(), storage.clone(), max_upload_size);

    if config.cleanup_interval_secs > 0 {
        let cleanup = Arc::new(CleanupService::new(
            photo_repository.clone(),
            storage.clone(),
            config.upload_retention_hours,
        ));
        cleanup.start(config.cleanup_interval_secs);
        tracing::info!(
            interval_secs = config.cleanup_interval_secs,
            retention_hours = config.upload_retention_hours,
            "Abandoned-upload sweeper started"
        );
    } else {
        tracing::warn!("Abandoned-upload sweeper disabled (UPLOAD_CLEANUP_INTERVAL_SECS=0)");
    }

    if config.telegram_webhook_secret.is_none() {
        tracing::warn!("TELEGRAM_WEBHOOK_SECRET not set; Telegram webhook is disabled");
    }

    let state = Arc::new(AppState {
        db: DbState {
            pool,
            photo_repository,
            report_repository,
            officer_repository,
            telegram_repository,
        },
        uploads: UploadState {
            service: upload_service,
            max_upload_size,
        },
        security: SecurityConfig {
            telegram_webhook_secret: config.telegram_webhook_secret.clone(),
            cors_origins: config.cors_origins.clone(),
        },
        config: config.clone(),
        is_production: config.is_production(),
    });

    Ok(state)
}
