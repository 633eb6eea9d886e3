// handler/shifts.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
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

pub fn shifts_handler() -> Router {
    Router::new()
        .route(
            "/shifts",
            post(create_shift)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Employer])
                }))
                .get(list_shifts),
        )
        .route("/shifts/mine", get(get_my_shifts))
        .route("/shifts/:shift_id", get(get_shift_details))
        .route(
            "/shifts/:shift_id/publish",
            put(publish_shift).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Employer])
            })),
        )
        .route(
            "/shifts/:shift_id/cancel",
            put(cancel_shift).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Employer, UserRole::Admin])
            })),
        )
        // Applications
        .route(
            "/shifts/:shift_id/applications",
            post(apply_to_shift)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Worker])
                }))
                .merge(get(get_shift_applications).layer(middleware::from_fn(
                    |state, req, next| role_check(state, req, next, vec![UserRole::Employer]),
                ))),
        )
        .route(
            "/applications/mine",
            get(get_my_applications).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route(
            "/applications/:application_id/status",
            put(decide_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Employer])
            })),
        )
}

pub async fn create_shift(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateShiftDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let shift = app_state
        .shift_service
        .create_shift(&auth.profile, body, None)
        .await?;

    Ok(Json(ApiResponse::success("Shift created successfully", shift)))
}

pub async fn list_shifts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ShiftQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let shifts = app_state.shift_service.list_shifts(&query).await?;

    Ok(Json(ApiResponse::success("Shifts retrieved successfully", shifts)))
}

pub async fn get_my_shifts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let shifts = match auth.profile.role {
        UserRole::Worker => app_state.shift_service.get_worker_shifts(auth.profile.id).await?,
        UserRole::Employer | UserRole::Admin => {
            app_state.shift_service.get_employer_shifts(auth.profile.id).await?
        }
    };

    Ok(Json(ApiResponse::success("Shifts retrieved successfully", shifts)))
}

pub async fn get_shift_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let details = app_state.shift_service.get_shift_details(shift_id).await?;

    Ok(Json(ApiResponse::success("Shift retrieved successfully", details)))
}

pub async fn publish_shift(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let shift = app_state
        .shift_service
        .publish_shift(shift_id, auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Shift published successfully", shift)))
}

pub async fn cancel_shift(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let shift = app_state
        .shift_service
        .cancel_shift(shift_id, &auth.profile)
        .await?;

    Ok(Json(ApiResponse::success("Shift cancelled successfully", shift)))
}

pub async fn apply_to_shift(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
    Json(body): Json<ApplyToShiftDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state
        .shift_service
        .apply_to_shift(shift_id, &auth.profile, body)
        .await?;

    Ok(Json(ApiResponse::success("Application submitted successfully", application)))
}

pub async fn get_shift_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .shift_service
        .get_shift_applications(shift_id, auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Applications retrieved successfully", applications)))
}

pub async fn get_my_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .shift_service
        .get_worker_applications(auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Applications retrieved successfully", applications)))
}

pub async fn decide_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<ApplicationDecisionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .shift_service
        .decide_application(application_id, auth.profile.id, body.status)
        .await?;

    Ok(Json(ApiResponse::success("Application updated successfully", application)))
}
