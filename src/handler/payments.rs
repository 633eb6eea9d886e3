// handler/payments.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::shiftdtos::{ApiResponse, ReleasePaymentDto},
    error::HttpError,
    middleware::{role_check, AuthContext},
    models::usermodel::UserRole,
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new()
        .route("/shifts/:shift_id/payments", get(get_shift_payments))
        .route(
            "/payments/mine",
            get(get_my_payments).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route(
            "/payments/:payment_id/release",
            post(release_payment).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Employer, UserRole::Admin])
            })),
        )
}

pub async fn get_shift_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state
        .payment_service
        .get_shift_payments(shift_id, &auth.profile)
        .await?;

    Ok(Json(ApiResponse::success("Payments retrieved successfully", payments)))
}

pub async fn get_my_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state
        .payment_service
        .get_worker_payments(auth.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Payments retrieved successfully", payments)))
}

pub async fn release_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<ReleasePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .payment_service
        .release_payment(payment_id, &auth.profile, body.mock)
        .await?;

    Ok(Json(ApiResponse::success("Payment released successfully", payment)))
}
