// handler/admin.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::profiledb::ProfileExt,
    dtos::shiftdtos::*,
    error::HttpError,
    middleware::{role_check, AuthContext},
    models::usermodel::{ModerationStatus, UserRole},
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/:profile_id/moderation", put(moderate_profile))
        .route("/revenue", get(get_revenue))
        .route("/reconcile", post(run_reconciliation))
        .route("/shifts/:shift_id/cancel", put(cancel_shift))
        .route("/payments/:payment_id/release", post(release_payment))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }))
}

pub async fn list_profiles(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ModerationQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let status = query.status.unwrap_or(ModerationStatus::Pending);

    let profiles = app_state
        .db_client
        .get_profiles_by_moderation_status(status, query.limit(), query.offset())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Profiles retrieved successfully", profiles)))
}

pub async fn moderate_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<ModerationDecisionDto>,
) -> Result<impl IntoResponse, HttpError> {
    if profile_id == auth.profile.id {
        return Err(HttpError::bad_request("You cannot moderate your own profile"));
    }

    app_state
        .db_client
        .get_profile(profile_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Profile not found"))?;

    let profile = app_state
        .db_client
        .update_moderation_status(profile_id, body.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        "Admin {} set profile {} to {}",
        auth.profile.id,
        profile_id,
        body.status.to_str()
    );

    Ok(Json(ApiResponse::success("Profile moderation updated", profile)))
}

pub async fn get_revenue(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let revenue = app_state.earnings_service.platform_revenue().await?;

    Ok(Json(ApiResponse::success("Revenue retrieved successfully", revenue)))
}

pub async fn run_reconciliation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    tracing::info!("Reconciliation triggered by admin {}", auth.profile.id);

    let report = app_state.reconcile_service.reconcile().await?;

    Ok(Json(ApiResponse::success("Reconciliation completed", report)))
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
