// handler/timesheets.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::shiftdtos::ApiResponse,
    error::HttpError,
    middleware::{role_check, AuthContext},
    models::usermodel::UserRole,
    service::lifecycle::ClockInOutcome,
    AppState,
};

pub fn timesheets_handler() -> Router {
    Router::new()
        .route(
            "/shifts/:shift_id/clock-in",
            post(clock_in).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route(
            "/shifts/:shift_id/clock-out",
            post(clock_out).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route("/shifts/:shift_id/timesheets", get(get_shift_timesheets))
        .route(
            "/timesheets/:timesheet_id/confirm",
            put(confirm_timesheet).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Employer])
            })),
        )
}

pub async fn clock_in(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state
        .shift_service
        .clock_in(shift_id, &auth.profile)
        .await?;

    let message = match result.outcome {
        ClockInOutcome::AlreadyClockedIn { .. } => "Already clocked in",
        ClockInOutcome::StartShift | ClockInOutcome::JoinRunningShift => "Clocked in successfully",
    };

    Ok(Json(ApiResponse::success(message, result)))
}

pub async fn clock_out(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let timesheet = app_state
        .shift_service
        .clock_out(shift_id, auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Clocked out successfully", timesheet)))
}

pub async fn get_shift_timesheets(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let timesheets = app_state
        .shift_service
        .get_shift_timesheets(shift_id, &auth.profile)
        .await?;

    Ok(Json(ApiResponse::success("Timesheets retrieved successfully", timesheets)))
}

pub async fn confirm_timesheet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(timesheet_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let confirmation = app_state
        .shift_service
        .confirm_timesheet(timesheet_id, auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Timesheet confirmed successfully", confirmation)))
}
