// handler/earnings.rs
use std::sync::Arc;

use axum::{
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    dtos::shiftdtos::ApiResponse,
    error::HttpError,
    middleware::{role_check, AuthContext},
    models::usermodel::UserRole,
    AppState,
};

pub fn earnings_handler() -> Router {
    Router::new().route(
        "/earnings",
        get(get_my_earnings).layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Worker])
        })),
    )
}

pub async fn get_my_earnings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let earnings = app_state
        .earnings_service
        .worker_earnings(auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Earnings retrieved successfully", earnings)))
}
