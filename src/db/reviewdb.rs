// db/reviewdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::dtos::shiftdtos::CreateReviewDto;
use crate::models::shiftmodel::Review;

#[async_trait]
pub trait ReviewExt {
    /// `None` when the reviewer already reviewed this shift.
    async fn create_review(
        &self,
        shift_id: Uuid,
        reviewer_id: Uuid,
        review: &CreateReviewDto,
    ) -> Result<Option<Review>, Error>;

    async fn get_public_reviews_for(&self, reviewee_id: Uuid) -> Result<Vec<Review>, Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        shift_id: Uuid,
        reviewer_id: Uuid,
        review: &CreateReviewDto,
    ) -> Result<Option<Review>, Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews
            (shift_id, reviewer_id, reviewee_id, overall_rating, punctuality_rating,
             quality_rating, communication_rating, would_recommend, comment, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (shift_id, reviewer_id) DO NOTHING
            RETURNING id, shift_id, reviewer_id, reviewee_id, overall_rating, punctuality_rating,
                      quality_rating, communication_rating, would_recommend, comment, is_public,
                      created_at
            "#
        )
        .bind(shift_id)
        .bind(reviewer_id)
        .bind(review.reviewee_id)
        .bind(review.overall_rating)
        .bind(review.punctuality_rating)
        .bind(review.quality_rating)
        .bind(review.communication_rating)
        .bind(review.would_recommend)
        .bind(&review.comment)
        .bind(review.is_public.unwrap_or(true))
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_public_reviews_for(&self, reviewee_id: Uuid) -> Result<Vec<Review>, Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, shift_id, reviewer_id, reviewee_id, overall_rating, punctuality_rating,
                   quality_rating, communication_rating, would_recommend, comment, is_public,
                   created_at
            FROM reviews
            WHERE reviewee_id = $1 AND is_public = TRUE
            ORDER BY created_at DESC
            "#
        )
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await
    }
}
