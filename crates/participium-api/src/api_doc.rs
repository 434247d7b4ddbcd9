//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use participium_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Participium API",
        version = "0.1.0",
        description = "Municipal civic-issue reporting platform. Citizens upload photos over a resumable tus-style protocol, submit geolocated reports, and municipality staff triage them. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Photo uploads
        handlers::photo_upload::create_upload,
        handlers::photo_upload::append_upload,
        handlers::photo_upload::upload_status,
        handlers::photo_upload::delete_upload,
        handlers::photo_upload::upload_options,
        // Reports
        handlers::reports::create_report,
        handlers::reports::get_report,
        handlers::reports::list_reports,
        handlers::reports::assign_report,
        handlers::reports::reject_report,
        // Officers
        handlers::officers::create_officer,
        handlers::officers::list_officers,
        // Telegram
        handlers::telegram::telegram_webhook,
    ),
    components(schemas(
        models::Photo,
        models::Report,
        models::Category,
        models::ReportStatus,
        models::Officer,
        handlers::reports::CreateReportRequest,
        handlers::reports::AssignReportRequest,
        handlers::reports::RejectReportRequest,
        handlers::officers::CreateOfficerRequest,
        handlers::telegram::LinkAccountRequest,
        error::ErrorResponse,
    )),
    tags(
        (name = "photos", description = "Resumable photo uploads"),
        (name = "reports", description = "Citizen reports and triage"),
        (name = "officers", description = "Municipality officers"),
        (name = "telegram", description = "Telegram bot boundary")
    )
)]
pub struct ApiDoc;
