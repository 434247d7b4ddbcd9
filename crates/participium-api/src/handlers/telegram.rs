//! Telegram webhook boundary.
//!
//! One endpoint receives everything the bot relays: account-link events as
//! JSON and full report submissions as multipart. Authentication is a shared
//! secret header set when the webhook is registered.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use participium_core::models::Category;
use participium_core::AppError;
use participium_db::NewReport;
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::MAX_PHOTOS_PER_REPORT;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadDescriptor;
use crate::state::AppState;

/// Header carrying the shared webhook secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-webhook-secret";

/// JSON payload linking a Telegram chat to a platform account token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkAccountRequest {
    pub chat_id: String,
    pub token: String,
}

/// Constant-time check of the shared secret. An unconfigured secret disables
/// the webhook entirely rather than leaving it open.
fn verify_webhook_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.security.telegram_webhook_secret.as_deref() else {
        return Err(AppError::Unauthorized(
            "Telegram webhook is not configured".to_string(),
        ));
    };

    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing webhook secret".to_string()))?;

    if provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
        return Err(AppError::Unauthorized("Invalid webhook secret".to_string()));
    }

    Ok(())
}

/// Telegram bot webhook.
///
/// `application/json` bodies link a chat to an account; `multipart/form-data`
/// bodies submit a report with inline photos.
#[utoipa::path(
    post,
    path = "/api/v1/telegram/webhook",
    tag = "telegram",
    params(
        ("x-telegram-webhook-secret" = String, Header, description = "Shared webhook secret"),
    ),
    request_body = LinkAccountRequest,
    responses(
        (status = 200, description = "Event processed"),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid secret", body = ErrorResponse)
    )
)]
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<impl IntoResponse, HttpAppError> {
    verify_webhook_secret(&state, request.headers())?;

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("application/json") {
        let body = axum::body::to_bytes(request.into_body(), 64 * 1024)
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read body: {}", e)))?;
        let link: LinkAccountRequest = serde_json::from_slice(&body)
            .map_err(|e| AppError::InvalidInput(format!("Invalid link payload: {}", e)))?;

        if link.chat_id.trim().is_empty() || link.token.trim().is_empty() {
            return Err(HttpAppError(AppError::InvalidInput(
                "chat_id and token must not be empty".to_string(),
            )));
        }

        state
            .db
            .telegram_repository
            .link_account(link.chat_id.trim(), link.token.trim())
            .await?;

        return Ok((StatusCode::OK, Json(json!({ "status": "linked" }))));
    }

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?;

        let report = submit_report_from_multipart(&state, multipart).await?;

        return Ok((
            StatusCode::OK,
            Json(json!({ "status": "created", "report_id": report.id })),
        ));
    }

    Err(HttpAppError(AppError::InvalidInput(format!(
        "Unsupported content type: {}",
        content_type
    ))))
}

/// One photo pulled out of the multipart body.
struct InlinePhoto {
    data: Vec<u8>,
    filename: Option<String>,
    content_type: Option<String>,
}

#[derive(Default)]
struct MultipartReport {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    chat_id: Option<String>,
    anonymous: bool,
    photos: Vec<InlinePhoto>,
}

async fn collect_multipart(mut multipart: Multipart) -> Result<MultipartReport, AppError> {
    let mut report = MultipartReport::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                if report.photos.len() >= MAX_PHOTOS_PER_REPORT {
                    return Err(AppError::InvalidInput(format!(
                        "A report may carry at most {} photos",
                        MAX_PHOTOS_PER_REPORT
                    )));
                }
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read photo: {}", e)))?
                    .to_vec();
                report.photos.push(InlinePhoto {
                    data,
                    filename,
                    content_type,
                });
            }
            other => {
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read field {}: {}", other, e))
                })?;
                match other {
                    "title" => report.title = Some(value),
                    "description" => report.description = Some(value),
                    "category" => report.category = Some(value),
                    "latitude" => report.latitude = Some(value),
                    "longitude" => report.longitude = Some(value),
                    "chat_id" => report.chat_id = Some(value),
                    "anonymous" => report.anonymous = value == "true" || value == "1",
                    unknown => {
                        tracing::debug!(field = unknown, "Ignoring unknown multipart field");
                    }
                }
            }
        }
    }

    Ok(report)
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing field: {}", name)))
}

fn parse_coordinate(value: Option<String>, name: &str, range: (f64, f64)) -> Result<f64, AppError> {
    let raw = required(value, name)?;
    let parsed: f64 = raw
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid {}: {}", name, raw)))?;
    if parsed < range.0 || parsed > range.1 {
        return Err(AppError::InvalidInput(format!(
            "{} out of range: {}",
            name, parsed
        )));
    }
    Ok(parsed)
}

/// Store the inline photos as completed upload sessions, then create the
/// report claiming them. Photos orphaned by a failed report creation fall to
/// the abandoned-upload sweep.
async fn submit_report_from_multipart(
    state: &AppState,
    multipart: Multipart,
) -> Result<participium_core::models::Report, AppError> {
    let fields = collect_multipart(multipart).await?;

    let title = required(fields.title, "title")?;
    let description = required(fields.description, "description")?;
    let chat_id = required(fields.chat_id, "chat_id")?;
    let category_raw = required(fields.category, "category")?;
    let category: Category = serde_json::from_value(serde_json::Value::String(category_raw.clone()))
        .map_err(|_| AppError::InvalidInput(format!("Unknown category: {}", category_raw)))?;
    let latitude = parse_coordinate(fields.latitude, "latitude", (-90.0, 90.0))?;
    let longitude = parse_coordinate(fields.longitude, "longitude", (-180.0, 180.0))?;

    if fields.photos.is_empty() {
        return Err(AppError::InvalidInput(
            "A Telegram report must include at least one photo".to_string(),
        ));
    }

    let mut photo_ids = Vec::with_capacity(fields.photos.len());
    for photo in &fields.photos {
        if photo.data.is_empty() {
            return Err(AppError::InvalidInput("Empty photo payload".to_string()));
        }
        let photo_id = Uuid::new_v4().to_string();
        state
            .uploads
            .service
            .create_session(
                &photo_id,
                photo.data.len() as i64,
                &photo.data,
                UploadDescriptor {
                    filename: photo.filename.clone(),
                    content_type: photo.content_type.clone(),
                },
            )
            .await?;
        photo_ids.push(photo_id);
    }

    let reporter = if fields.anonymous {
        None
    } else {
        Some(format!("telegram:{}", chat_id))
    };

    let report = state
        .db
        .report_repository
        .create(
            NewReport {
                title,
                description,
                category,
                latitude,
                longitude,
                anonymous: fields.anonymous,
                reporter,
            },
            &photo_ids,
        )
        .await?;

    tracing::info!(
        report_id = %report.id,
        chat_id = %chat_id,
        photos = photo_ids.len(),
        "Report submitted via Telegram"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_extraction() {
        assert_eq!(
            required(Some("  pothole ".to_string()), "title").unwrap(),
            "pothole"
        );
        assert!(required(Some("   ".to_string()), "title").is_err());
        assert!(required(None, "title").is_err());
    }

    #[test]
    fn test_coordinate_parsing() {
        assert_eq!(
            parse_coordinate(Some("45.07".to_string()), "latitude", (-90.0, 90.0)).unwrap(),
            45.07
        );
        assert!(parse_coordinate(Some("91.0".to_string()), "latitude", (-90.0, 90.0)).is_err());
        assert!(parse_coordinate(Some("north".to_string()), "latitude", (-90.0, 90.0)).is_err());
    }

    #[test]
    fn test_category_string_parsing() {
        let category: Category =
            serde_json::from_value(serde_json::Value::String("waste".to_string())).unwrap();
        assert_eq!(category, Category::Waste);

        let err: Result<Category, _> =
            serde_json::from_value(serde_json::Value::String("potholes".to_string()));
        assert!(err.is_err());
    }
}
