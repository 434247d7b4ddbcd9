//! Resumable photo upload handlers.
//!
//! tus-flavored protocol: the whole payload arrives with the creation request
//! when possible, and interrupted transfers resume by probing the offset and
//! appending the remainder. Every route except OPTIONS requires the
//! `tus-resumable` version header.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use participium_core::AppError;

use crate::constants::{API_PREFIX, TUS_EXTENSIONS, TUS_VERSION};
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadDescriptor;
use crate::state::UploadState;
use crate::tus;

/// Create an upload session under a client-chosen id.
///
/// The creation request carries the full payload: `upload-length` must equal
/// the body size. Optional `upload-metadata` supplies `filename` and
/// `filetype`.
#[utoipa::path(
    post,
    path = "/api/v1/photos/{photo_id}",
    tag = "photos",
    params(
        ("photo_id" = String, Path, description = "Client-chosen upload id"),
        ("tus-resumable" = String, Header, description = "Protocol version, must be 1.0.0"),
        ("upload-length" = i64, Header, description = "Total payload size in bytes"),
        ("upload-metadata" = Option<String>, Header, description = "Comma-separated `key base64(value)` pairs"),
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Session created, payload stored"),
        (status = 400, description = "Invalid id, length, or metadata", body = ErrorResponse),
        (status = 409, description = "Upload id already in use", body = ErrorResponse),
        (status = 412, description = "Unsupported protocol version", body = ErrorResponse),
        (status = 413, description = "Declared length exceeds the maximum", body = ErrorResponse)
    )
)]
pub async fn create_upload(
    State(uploads): State<UploadState>,
    Path(photo_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    tus::require_supported_version(&headers)?;
    tus::validate_upload_id(&photo_id)?;

    let declared_length = tus::parse_upload_length(&headers)?;
    let metadata = tus::parse_upload_metadata(&headers)?;

    let descriptor = UploadDescriptor {
        filename: metadata.get("filename").cloned(),
        content_type: metadata.get("filetype").cloned(),
    };

    let photo = uploads
        .service
        .create_session(&photo_id, declared_length, &body, descriptor)
        .await?;

    Ok((
        StatusCode::CREATED,
        [
            (
                "location",
                format!("{}/photos/{}", API_PREFIX, photo.id),
            ),
            (tus::TUS_RESUMABLE, TUS_VERSION.to_string()),
            (tus::UPLOAD_OFFSET, photo.received_offset.to_string()),
        ],
    ))
}

/// Append a chunk to an existing session at the client's offset.
#[utoipa::path(
    patch,
    path = "/api/v1/photos/{photo_id}",
    tag = "photos",
    params(
        ("photo_id" = String, Path, description = "Upload session id"),
        ("tus-resumable" = String, Header, description = "Protocol version, must be 1.0.0"),
        ("upload-offset" = i64, Header, description = "Offset the client believes is current"),
    ),
    request_body(content = Vec<u8>, content_type = "application/offset+octet-stream"),
    responses(
        (status = 204, description = "Chunk accepted, new offset in upload-offset"),
        (status = 400, description = "Invalid offset header or content type", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Offset mismatch", body = ErrorResponse),
        (status = 412, description = "Unsupported protocol version", body = ErrorResponse),
        (status = 413, description = "Chunk would exceed the declared length", body = ErrorResponse)
    )
)]
pub async fn append_upload(
    State(uploads): State<UploadState>,
    Path(photo_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    tus::require_supported_version(&headers)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type != tus::OFFSET_OCTET_STREAM {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "Append requests must use content-type {}",
            tus::OFFSET_OCTET_STREAM
        ))));
    }

    let client_offset = tus::parse_upload_offset(&headers)?;

    let photo = uploads
        .service
        .append_chunk(&photo_id, client_offset, &body)
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        [
            (tus::TUS_RESUMABLE, TUS_VERSION.to_string()),
            (tus::UPLOAD_OFFSET, photo.received_offset.to_string()),
        ],
    ))
}

/// Probe the current offset of a session.
///
/// Responses are marked uncacheable so a resuming client never acts on a
/// stale offset.
#[utoipa::path(
    head,
    path = "/api/v1/photos/{photo_id}",
    tag = "photos",
    params(
        ("photo_id" = String, Path, description = "Upload session id"),
        ("tus-resumable" = String, Header, description = "Protocol version, must be 1.0.0"),
    ),
    responses(
        (status = 200, description = "Offset and length in response headers"),
        (status = 404, description = "Unknown session"),
        (status = 412, description = "Unsupported protocol version")
    )
)]
pub async fn upload_status(
    State(uploads): State<UploadState>,
    Path(photo_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpAppError> {
    tus::require_supported_version(&headers)?;

    let photo = uploads.service.session_status(&photo_id).await?;

    Ok((
        StatusCode::OK,
        [
            (tus::TUS_RESUMABLE, TUS_VERSION.to_string()),
            (tus::UPLOAD_OFFSET, photo.received_offset.to_string()),
            (tus::UPLOAD_LENGTH, photo.declared_length.to_string()),
            ("cache-control", "no-store".to_string()),
        ],
    ))
}

/// Terminate a session and discard its bytes.
#[utoipa::path(
    delete,
    path = "/api/v1/photos/{photo_id}",
    tag = "photos",
    params(
        ("photo_id" = String, Path, description = "Upload session id"),
        ("tus-resumable" = String, Header, description = "Protocol version, must be 1.0.0"),
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 412, description = "Unsupported protocol version", body = ErrorResponse)
    )
)]
pub async fn delete_upload(
    State(uploads): State<UploadState>,
    Path(photo_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpAppError> {
    tus::require_supported_version(&headers)?;

    uploads.service.delete_session(&photo_id).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(tus::TUS_RESUMABLE, TUS_VERSION.to_string())],
    ))
}

/// Capability descriptor. The only route that skips the version check, so
/// clients can discover what the server speaks.
#[utoipa::path(
    options,
    path = "/api/v1/photos",
    tag = "photos",
    responses(
        (status = 204, description = "Supported version, extensions, and size cap in headers")
    )
)]
pub async fn upload_options(State(uploads): State<UploadState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (tus::TUS_RESUMABLE, TUS_VERSION.to_string()),
            ("tus-version", TUS_VERSION.to_string()),
            ("tus-max-size", uploads.max_upload_size.to_string()),
            ("tus-extension", TUS_EXTENSIONS.to_string()),
        ],
    )
}
