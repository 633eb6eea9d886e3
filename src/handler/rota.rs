// handler/rota.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::shiftdtos::{ApiResponse, CreateRotaDto, CreateShiftDto},
    error::HttpError,
    middleware::{role_check, AuthContext},
    models::usermodel::UserRole,
    AppState,
};

pub fn rota_handler() -> Router {
    Router::new()
        .route("/rotas", post(create_rota).get(get_my_rotas))
        .route("/rotas/:rota_id", get(get_rota))
        .route("/rotas/:rota_id/shifts", post(add_rota_shift))
        .route("/rotas/:rota_id/publish", put(publish_rota))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Employer])
        }))
}

pub async fn create_rota(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateRotaDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let rota = app_state
        .rota_service
        .create_rota(&auth.profile, body)
        .await?;

    Ok(Json(ApiResponse::success("Rota created successfully", rota)))
}

pub async fn get_my_rotas(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let rotas = app_state
        .rota_service
        .get_employer_rotas(auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Rotas retrieved successfully", rotas)))
}

pub async fn get_rota(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(rota_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let rota = app_state
        .rota_service
        .get_rota(rota_id, auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Rota retrieved successfully", rota)))
}

pub async fn add_rota_shift(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(rota_id): Path<Uuid>,
    Json(body): Json<CreateShiftDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let shift = app_state
        .rota_service
        .add_shift(rota_id, &auth.profile, body)
        .await?;

    Ok(Json(ApiResponse::success("Shift added to rota", shift)))
}

pub async fn publish_rota(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(rota_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let rota = app_state
        .rota_service
        .publish_rota(rota_id, auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Rota published successfully", rota)))
}
