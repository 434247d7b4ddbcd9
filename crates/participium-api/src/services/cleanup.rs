//! Background sweep of abandoned upload sessions.
//!
//! Photos that were never attached to a report (`report_id IS NULL`) and are
//! older than the retention window are deleted from the database and storage.

use std::sync::Arc;
use std::time::Duration;

use participium_db::PhotoRepository;
use participium_storage::Storage;
use tokio::time::interval;

#[derive(Clone)]
pub struct CleanupService {
    photo_repository: PhotoRepository,
    storage: Arc<dyn Storage>,
    retention_hours: i64,
}

impl CleanupService {
    pub fn new(
        photo_repository: PhotoRepository,
        storage: Arc<dyn Storage>,
        retention_hours: i64,
    ) -> Self {
        Self {
            photo_repository,
            storage,
            retention_hours,
        }
    }

    /// Spawn the periodic sweep as a detached background task. The task runs
    /// for the lifetime of the process; a missed sweep is recovered by the
    /// next tick, so nothing waits on it during shutdown.
    pub fn start(self: Arc<Self>, interval_secs: u64) {
        tokio::spawn(async move {
            let mut sweep_interval = interval(Duration::from_secs(interval_secs));

            loop {
                sweep_interval.tick().await;

                if let Err(e) = self.sweep_abandoned_uploads().await {
                    tracing::error!(error = %e, "Cleanup sweep failed");
                }
            }
        });
    }

    /// Delete unclaimed photos older than the retention window. The database
    /// rows go first; storage objects are removed afterwards, and a failed
    /// storage delete is logged and retried implicitly on the next sweep only
    /// if the key reappears, so it is reported loudly.
    #[tracing::instrument(skip(self), fields(retention_hours = self.retention_hours))]
    pub async fn sweep_abandoned_uploads(&self) -> Result<usize, anyhow::Error> {
        let storage_keys = self
            .photo_repository
            .delete_abandoned(self.retention_hours)
            .await?;
        let count = storage_keys.len();

        for key in &storage_keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::error!(
                    error = %e,
                    storage_key = %key,
                    "Failed to delete abandoned upload from storage"
                );
            }
        }

        if count > 0 {
            tracing::info!(deleted = count, "Cleanup sweep completed");
        } else {
            tracing::debug!("Cleanup sweep found nothing to delete");
        }

        Ok(count)
    }
}
