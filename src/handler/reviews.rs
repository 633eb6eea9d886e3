// handler/reviews.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::shiftdtos::{ApiResponse, CreateReviewDto},
    error::HttpError,
    middleware::AuthContext,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/shifts/:shift_id/reviews", post(create_review))
        .route("/profiles/:profile_id/reviews", get(get_profile_reviews))
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(shift_id): Path<Uuid>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let review = app_state
        .review_service
        .create_review(shift_id, auth.profile.id, &body)
        .await?;

    Ok(Json(ApiResponse::success("Review submitted successfully", review)))
}

pub async fn get_profile_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state.review_service.get_public_reviews(profile_id).await?;

    Ok(Json(ApiResponse::success("Reviews retrieved successfully", reviews)))
}
