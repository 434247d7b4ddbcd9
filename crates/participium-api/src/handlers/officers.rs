//! Officer management handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use participium_core::models::Officer;
use participium_core::AppError;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOfficerRequest {
    pub username: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOfficersQuery {
    /// Filter by department.
    pub department: Option<String>,
}

/// Register a municipality officer.
#[utoipa::path(
    post,
    path = "/api/v1/officers",
    tag = "officers",
    request_body = CreateOfficerRequest,
    responses(
        (status = 201, description = "Officer created", body = Officer),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username already in use", body = ErrorResponse)
    )
)]
pub async fn create_officer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateOfficerRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let username = request.username.trim();
    let email = request.email.trim();
    let department = request.department.trim();

    if username.is_empty() || department.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "Username and department must not be empty".to_string(),
        )));
    }
    if !email.contains('@') {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "Invalid email address: {}",
            email
        ))));
    }

    let officer = state
        .db
        .officer_repository
        .create(username, email, department)
        .await?;

    Ok((StatusCode::CREATED, Json(officer)))
}

/// List officers, optionally filtered by department.
#[utoipa::path(
    get,
    path = "/api/v1/officers",
    tag = "officers",
    params(ListOfficersQuery),
    responses(
        (status = 200, description = "Matching officers", body = Vec<Officer>)
    )
)]
pub async fn list_officers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOfficersQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let officers = state
        .db
        .officer_repository
        .list(query.department.as_deref())
        .await?;

    Ok(Json(officers))
}
