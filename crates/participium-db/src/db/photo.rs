use participium_core::models::Photo;
use participium_core::AppError;
use sqlx::PgPool;

use super::is_unique_violation;

/// Repository for photo rows, which double as resumable upload sessions.
#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new photo row, reserving the client-chosen id.
    ///
    /// The insert runs before any bytes hit storage so a duplicate id fails
    /// here and leaves the original session untouched.
    pub async fn create(
        &self,
        id: &str,
        declared_length: i64,
        received_offset: i64,
        storage_key: &str,
        url: &str,
        filename: &str,
        content_type: &str,
    ) -> Result<Photo, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (
                id, declared_length, received_offset, storage_key, url,
                filename, content_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, declared_length, received_offset, storage_key, url,
                      filename, content_type, report_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(declared_length)
        .bind(received_offset)
        .bind(storage_key)
        .bind(url)
        .bind(filename)
        .bind(content_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Upload id already in use: {}", id))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(photo)
    }

    /// Get a photo by id.
    pub async fn get(&self, id: &str) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, declared_length, received_offset, storage_key, url,
                   filename, content_type, report_id, created_at, updated_at
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    /// Advance the received offset by `chunk_len`, but only if the stored
    /// offset still equals `client_offset` and the result stays within the
    /// declared length. The single conditional UPDATE is the transaction
    /// boundary for the read-modify-write: concurrent appenders race on the
    /// row and exactly one wins.
    ///
    /// Returns the new offset, or classifies the failure by re-reading the
    /// row and replaying the transition rules.
    pub async fn advance_offset(
        &self,
        id: &str,
        client_offset: i64,
        chunk_len: i64,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE photos
            SET received_offset = received_offset + $3, updated_at = NOW()
            WHERE id = $1
              AND received_offset = $2
              AND received_offset + $3 <= declared_length
            "#,
        )
        .bind(id)
        .bind(client_offset)
        .bind(chunk_len)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(client_offset + chunk_len);
        }

        let photo = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload session not found: {}", id)))?;

        // Replaying the transition surfaces the precise violation.
        photo.transition().append(client_offset, chunk_len)?;

        // The transition would have succeeded against the re-read state, so a
        // concurrent writer moved the offset between our UPDATE and the read.
        Err(AppError::OffsetMismatch {
            client: client_offset,
            server: photo.received_offset,
        })
    }

    /// Delete a photo row and return its storage key so the caller can remove
    /// the bytes. Fails with `NotFound` if the session never existed.
    pub async fn delete(&self, id: &str) -> Result<String, AppError> {
        let row: Option<(String,)> =
            sqlx::query_as("DELETE FROM photos WHERE id = $1 RETURNING storage_key")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(key,)| key)
            .ok_or_else(|| AppError::NotFound(format!("Upload session not found: {}", id)))
    }

    /// Remove photos never claimed by a report and older than the retention
    /// window. Returns the storage keys of the deleted rows.
    pub async fn delete_abandoned(&self, older_than_hours: i64) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            DELETE FROM photos
            WHERE report_id IS NULL
              AND created_at < NOW() - make_interval(hours => $1::int)
            RETURNING storage_key
            "#,
        )
        .bind(older_than_hours)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}
