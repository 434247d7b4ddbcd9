//! Report submission, listing, and officer triage handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use participium_core::models::{Category, Report, ReportStatus};
use participium_core::AppError;
use participium_db::NewReport;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::constants::MAX_PHOTOS_PER_REPORT;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Request to submit a new report. Photos must already be fully uploaded.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReportRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    /// Hide the reporter's identity from everyone but the platform.
    #[serde(default)]
    pub anonymous: bool,
    /// Opaque reporter reference; ignored when `anonymous` is set.
    #[serde(default)]
    pub reporter: Option<String>,
    /// Ids of previously uploaded photos to attach (at most 3).
    #[serde(default)]
    pub photo_ids: Vec<String>,
}

/// Request to assign a report to the least-loaded officer of a department.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignReportRequest {
    pub department: String,
}

/// Request to reject a report during triage.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectReportRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReportsQuery {
    /// Filter by lifecycle status.
    pub status: Option<ReportStatus>,
}

fn validate_report_request(request: &CreateReportRequest) -> Result<(), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }
    if request.description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Description must not be empty".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&request.latitude) {
        return Err(AppError::InvalidInput(format!(
            "Latitude out of range: {}",
            request.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&request.longitude) {
        return Err(AppError::InvalidInput(format!(
            "Longitude out of range: {}",
            request.longitude
        )));
    }
    if request.photo_ids.len() > MAX_PHOTOS_PER_REPORT {
        return Err(AppError::InvalidInput(format!(
            "A report may reference at most {} photos",
            MAX_PHOTOS_PER_REPORT
        )));
    }
    Ok(())
}

/// Submit a new report.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = Report),
        (status = 400, description = "Invalid input or unclaimable photo ids", body = ErrorResponse)
    )
)]
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateReportRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_report_request(&request)?;

    let reporter = if request.anonymous {
        None
    } else {
        request.reporter.clone()
    };

    let report = state
        .db
        .report_repository
        .create(
            NewReport {
                title: request.title.trim().to_string(),
                description: request.description.trim().to_string(),
                category: request.category,
                latitude: request.latitude,
                longitude: request.longitude,
                anonymous: request.anonymous,
                reporter,
            },
            &request.photo_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// Get a report by id.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{report_id}",
    tag = "reports",
    params(("report_id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "The report", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let report = state
        .db
        .report_repository
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report not found: {}", report_id)))?;

    Ok(Json(report))
}

/// List reports, newest first, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Matching reports", body = Vec<Report>)
    )
)]
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListReportsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let reports = state.db.report_repository.list(query.status).await?;
    Ok(Json(reports))
}

/// Assign a pending report to the least-loaded officer of a department.
///
/// Load is the count of non-terminal reports already assigned to the officer.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{report_id}/assign",
    tag = "reports",
    params(("report_id" = Uuid, Path, description = "Report id")),
    request_body = AssignReportRequest,
    responses(
        (status = 200, description = "Report assigned", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "No officers in the department", body = ErrorResponse)
    )
)]
pub async fn assign_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AssignReportRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.department.trim().is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "Department must not be empty".to_string(),
        )));
    }

    // Officer selection happens first so an empty department writes nothing.
    let officer = state
        .db
        .officer_repository
        .least_loaded_in_department(request.department.trim())
        .await?;

    let report = state
        .db
        .report_repository
        .assign(report_id, officer.id)
        .await?;

    tracing::info!(
        report_id = %report_id,
        officer_id = %officer.id,
        department = %officer.department,
        "Report assigned"
    );

    Ok(Json(report))
}

/// Reject a pending report with a reason.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{report_id}/reject",
    tag = "reports",
    params(("report_id" = Uuid, Path, description = "Report id")),
    request_body = RejectReportRequest,
    responses(
        (status = 200, description = "Report rejected", body = Report),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn reject_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RejectReportRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.reason.trim().is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "Rejection reason must not be empty".to_string(),
        )));
    }

    let report = state
        .db
        .report_repository
        .reject(report_id, request.reason.trim())
        .await?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateReportRequest {
        CreateReportRequest {
            title: "Broken streetlight".to_string(),
            description: "The light on the corner has been out for a week".to_string(),
            category: Category::PublicLighting,
            latitude: 45.07,
            longitude: 7.69,
            anonymous: false,
            reporter: Some("user-42".to_string()),
            photo_ids: vec!["photo-1".to_string()],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_report_request(&request()).is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut req = request();
        req.title = "   ".to_string();
        assert!(matches!(
            validate_report_request(&req),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let mut req = request();
        req.latitude = 91.0;
        assert!(validate_report_request(&req).is_err());

        let mut req = request();
        req.longitude = -180.5;
        assert!(validate_report_request(&req).is_err());
    }

    #[test]
    fn test_too_many_photos_rejected() {
        let mut req = request();
        req.photo_ids = (0..4).map(|i| format!("photo-{}", i)).collect();
        assert!(matches!(
            validate_report_request(&req),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_photo_cap_boundary() {
        let mut req = request();
        req.photo_ids = (0..3).map(|i| format!("photo-{}", i)).collect();
        assert!(validate_report_request(&req).is_ok());
    }
}
