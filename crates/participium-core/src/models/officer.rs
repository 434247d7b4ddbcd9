//! Municipality officer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Officer who triages and resolves reports. Officers are grouped into
/// departments; assignment routes a report to the least-loaded officer of the
/// target department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Officer {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}
