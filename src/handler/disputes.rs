// handler/disputes.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::shiftdtos::*,
    error::HttpError,
    middleware::{role_check, AuthContext},
    models::usermodel::UserRole,
    AppState,
};

pub fn disputes_handler() -> Router {
    Router::new()
        .route(
            "/timesheets/:timesheet_id/disputes",
            post(raise_dispute).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Employer])
            })),
        )
        .route("/shifts/:shift_id/disputes", get(get_shift_disputes))
        .route(
            "/disputes",
            get(list_disputes).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Admin])
            })),
        )
        .route(
            "/disputes/:dispute_id",
            get(get_dispute)
                .put(update_dispute)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin])
                })),
        )
}

pub async fn raise_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(timesheet_id): Path<Uuid>,
    Json(body): Json<CreateDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .raise_dispute(timesheet_id, auth.profile.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Dispute raised successfully", dispute)))
}

pub async fn get_shift_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let disputes = app_state
        .dispute_service
        .get_shift_disputes(shift_id, &auth.profile)
        .await?;

    Ok(Json(ApiResponse::success("Disputes retrieved successfully", disputes)))
}

pub async fn list_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<DisputeQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let disputes = app_state.dispute_service.list_disputes(query.status).await?;

    Ok(Json(ApiResponse::success("Disputes retrieved successfully", disputes)))
}

pub async fn get_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(dispute_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let dispute = app_state.dispute_service.get_dispute(dispute_id).await?;

    Ok(Json(ApiResponse::success("Dispute retrieved successfully", dispute)))
}

pub async fn update_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<UpdateDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .update_dispute(dispute_id, auth.profile.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Dispute updated successfully", dispute)))
}
