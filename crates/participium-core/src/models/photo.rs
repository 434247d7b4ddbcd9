//! Photo entity: one uploaded image and its resumable-upload session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::upload::UploadTransition;

/// One uploaded photo. The row doubles as the upload session: `received_offset`
/// tracks how many of the `declared_length` bytes have been persisted, and the
/// photo is complete when the two are equal (derived, not stored).
///
/// `id` is chosen by the client at session creation and is globally unique; it
/// also seeds the storage key. `report_id` stays unset until a report claims
/// the photo, which may happen after the upload or never.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Photo {
    pub id: String,
    pub declared_length: i64,
    pub received_offset: i64,
    pub storage_key: String,
    pub url: String,
    pub filename: String,
    pub content_type: String,
    pub report_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Photo {
    /// Byte-accounting view of this photo's upload session.
    pub fn transition(&self) -> UploadTransition {
        UploadTransition {
            declared_length: self.declared_length,
            received_offset: self.received_offset,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.transition().is_complete()
    }
}
