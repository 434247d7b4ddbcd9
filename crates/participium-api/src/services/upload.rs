//! Resumable upload orchestration.
//!
//! Coordinates the photo repository (byte accounting) and the storage backend
//! (actual bytes). The repository row is the source of truth for offsets; the
//! storage object trails it and is reconciled on every append.

use std::sync::Arc;

use participium_core::{models::Photo, AppError, UploadTransition};
use participium_db::PhotoRepository;
use participium_storage::Storage;

use crate::error::app_error_from_storage;

/// Metadata captured when a session is created.
#[derive(Debug, Clone, Default)]
pub struct UploadDescriptor {
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct UploadService {
    photo_repository: PhotoRepository,
    storage: Arc<dyn Storage>,
    max_upload_size: i64,
}

impl UploadService {
    pub fn new(
        photo_repository: PhotoRepository,
        storage: Arc<dyn Storage>,
        max_upload_size: i64,
    ) -> Self {
        Self {
            photo_repository,
            storage,
            max_upload_size,
        }
    }

    /// Create an upload session under a client-chosen id.
    ///
    /// The entire payload must arrive with the creation request: `data.len()`
    /// has to equal `declared_length`. The row is inserted first so the id is
    /// reserved before any bytes hit disk; if the storage write fails the row
    /// is rolled back and the id becomes available again.
    #[tracing::instrument(skip(self, data), fields(photo_id = %id, declared_length))]
    pub async fn create_session(
        &self,
        id: &str,
        declared_length: i64,
        data: &[u8],
        descriptor: UploadDescriptor,
    ) -> Result<Photo, AppError> {
        if declared_length > self.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "Declared length {} exceeds the maximum of {} bytes",
                declared_length, self.max_upload_size
            )));
        }

        let transition = UploadTransition::create(declared_length, data.len() as i64)?;

        let storage_key = format!("photos/{}", id);
        let url = self.storage.url_for(&storage_key);
        let filename = descriptor.filename.unwrap_or_else(|| id.to_string());
        let content_type = descriptor
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let photo = self
            .photo_repository
            .create(
                id,
                transition.declared_length,
                transition.received_offset,
                &storage_key,
                &url,
                &filename,
                &content_type,
            )
            .await?;

        match self.storage.write_new(&storage_key, data).await {
            Ok(_) => {
                tracing::info!(photo_id = %id, bytes = data.len(), "Upload session created");
                Ok(photo)
            }
            Err(err) => {
                // Roll the reservation back so the id is reusable.
                if let Err(cleanup_err) = self.photo_repository.delete(id).await {
                    tracing::warn!(
                        photo_id = %id,
                        error = %cleanup_err,
                        "Failed to roll back photo row after storage failure"
                    );
                }
                Err(app_error_from_storage(err))
            }
        }
    }

    /// Append a chunk at `client_offset`.
    ///
    /// The transition is pre-checked against a fresh read so obviously bad
    /// requests fail before touching disk; the conditional UPDATE in
    /// `advance_offset` is still the authority under concurrency, so a racing
    /// writer surfaces as an offset mismatch rather than corrupting the count.
    #[tracing::instrument(skip(self, data), fields(photo_id = %id, client_offset))]
    pub async fn append_chunk(
        &self,
        id: &str,
        client_offset: i64,
        data: &[u8],
    ) -> Result<Photo, AppError> {
        let photo = self
            .photo_repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload session {} not found", id)))?;

        let chunk_len = data.len() as i64;
        photo.transition().append(client_offset, chunk_len)?;

        if !data.is_empty() {
            self.storage
                .write_at(&photo.storage_key, client_offset as u64, data)
                .await
                .map_err(app_error_from_storage)?;
        }

        let new_offset = self
            .photo_repository
            .advance_offset(id, client_offset, chunk_len)
            .await?;

        tracing::debug!(
            photo_id = %id,
            new_offset,
            declared_length = photo.declared_length,
            "Chunk appended"
        );

        Ok(Photo {
            received_offset: new_offset,
            ..photo
        })
    }

    /// Current session state for a STATUS probe.
    pub async fn session_status(&self, id: &str) -> Result<Photo, AppError> {
        self.photo_repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload session {} not found", id)))
    }

    /// Terminate a session, removing both the row and the stored bytes.
    ///
    /// Deleting a session that never existed is 404; the storage delete is
    /// best effort because the abandoned-object sweep covers stragglers.
    #[tracing::instrument(skip(self), fields(photo_id = %id))]
    pub async fn delete_session(&self, id: &str) -> Result<(), AppError> {
        let storage_key = self.photo_repository.delete(id).await?;

        if let Err(err) = self.storage.delete(&storage_key).await {
            tracing::warn!(
                photo_id = %id,
                storage_key = %storage_key,
                error = %err,
                "Failed to delete stored bytes, leaving to cleanup sweep"
            );
        }

        tracing::info!(photo_id = %id, "Upload session deleted");
        Ok(())
    }
}
