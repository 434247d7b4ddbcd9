//! Report entity and its closed enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Issue category. Closed enumeration mirroring the municipality's triage
/// departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WaterSewer,
    ArchitecturalBarriers,
    PublicLighting,
    RoadsUrbanFurniture,
    Waste,
    PublicGreen,
    RoadSigns,
    Other,
}

/// Report lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    PendingApproval,
    Assigned,
    InProgress,
    Suspended,
    Resolved,
    Rejected,
}

impl ReportStatus {
    /// Terminal reports no longer count toward an officer's load.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }
}

/// Citizen-submitted issue. Created in one step with all photos already
/// uploaded and referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub anonymous: bool,
    /// Opaque reference to the creator (web user id or Telegram chat id);
    /// absent for anonymous submissions.
    pub reporter: Option<String>,
    pub status: ReportStatus,
    pub assigned_officer_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(ReportStatus::Resolved.is_terminal());
        assert!(ReportStatus::Rejected.is_terminal());
        assert!(!ReportStatus::PendingApproval.is_terminal());
        assert!(!ReportStatus::Assigned.is_terminal());
        assert!(!ReportStatus::InProgress.is_terminal());
        assert!(!ReportStatus::Suspended.is_terminal());
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::RoadsUrbanFurniture).unwrap();
        assert_eq!(json, "\"roads_urban_furniture\"");
        let back: Category = serde_json::from_str("\"public_lighting\"").unwrap();
        assert_eq!(back, Category::PublicLighting);
    }
}
