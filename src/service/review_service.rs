// service/review_service.rs
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::ToPrimitive;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, profiledb::ProfileExt, reviewdb::ReviewExt, shiftdb::ShiftExt},
    dtos::shiftdtos::CreateReviewDto,
    models::shiftmodel::*,
    service::error::ServiceError,
};

/// Denormalised rating summary stored on a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAggregate {
    pub total_reviews: i32,
    pub average_rating: f64,
    pub would_recommend_percentage: i32,
}

/// Summarises the public reviews of one profile. The average and the
/// recommend percentage are rounded half-up, like money; an empty set
/// yields zeros.
pub fn aggregate_reviews(reviews: &[Review]) -> ReviewAggregate {
    if reviews.is_empty() {
        return ReviewAggregate {
            total_reviews: 0,
            average_rating: 0.0,
            would_recommend_percentage: 0,
        };
    }

    let count = BigDecimal::from(reviews.len() as i64);
    let rating_sum: i64 = reviews.iter().map(|r| r.overall_rating as i64).sum();
    let recommends = reviews.iter().filter(|r| r.would_recommend).count() as i64;

    let average =
        (BigDecimal::from(rating_sum) / count.clone()).with_scale_round(2, RoundingMode::HalfUp);
    let percentage =
        (BigDecimal::from(recommends * 100) / count).with_scale_round(0, RoundingMode::HalfUp);

    ReviewAggregate {
        total_reviews: reviews.len() as i32,
        average_rating: average.to_f64().unwrap_or(0.0),
        would_recommend_percentage: percentage.to_i32().unwrap_or(0),
    }
}

#[derive(Debug, Clone)]
pub struct ReviewService {
    db_client: Arc<DBClient>,
}

impl ReviewService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn create_review(
        &self,
        shift_id: Uuid,
        reviewer_id: Uuid,
        body: &CreateReviewDto,
    ) -> Result<Review, ServiceError> {
        let shift = self
            .db_client
            .get_shift(shift_id)
            .await?
            .ok_or(ServiceError::ShiftNotFound(shift_id))?;

        if shift.effective_status() != ShiftStatus::Completed {
            return Err(ServiceError::InvalidShiftStatus(shift_id, shift.effective_status()));
        }

        if reviewer_id == body.reviewee_id {
            return Err(ServiceError::Validation("You cannot review yourself".to_string()));
        }

        let timesheets = self.db_client.get_shift_timesheets(shift_id).await?;
        let worked = |id: Uuid| timesheets.iter().any(|t| t.worker_id == id);

        // Employer reviews a worker who clocked in, or a worker reviews the employer
        let counterpart = if reviewer_id == shift.employer_id {
            worked(body.reviewee_id)
        } else if worked(reviewer_id) {
            body.reviewee_id == shift.employer_id
        } else {
            return Err(ServiceError::UnauthorizedShiftAccess(reviewer_id, shift_id));
        };

        if !counterpart {
            return Err(ServiceError::Validation(
                "Reviewee did not take part in this shift".to_string(),
            ));
        }

        let review = self
            .db_client
            .create_review(shift_id, reviewer_id, body)
            .await?
            .ok_or_else(|| ServiceError::Conflict("You have already reviewed this shift".to_string()))?;

        let aggregate = self.refresh_aggregates(body.reviewee_id).await?;

        tracing::info!(
            "Review {} recorded for {} on shift {}: average now {} over {} reviews",
            review.id,
            review.reviewee_id,
            shift_id,
            aggregate.average_rating,
            aggregate.total_reviews
        );

        Ok(review)
    }

    /// Recomputes and stores the aggregates of one profile from its public reviews.
    pub async fn refresh_aggregates(&self, profile_id: Uuid) -> Result<ReviewAggregate, ServiceError> {
        let reviews = self.db_client.get_public_reviews_for(profile_id).await?;
        let aggregate = aggregate_reviews(&reviews);
        self.db_client
            .update_review_aggregates(profile_id, &aggregate)
            .await?;
        Ok(aggregate)
    }

    pub async fn get_public_reviews(&self, profile_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        Ok(self.db_client.get_public_reviews_for(profile_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32, recommend: bool) -> Review {
        Review {
            id: Uuid::new_v4(),
            shift_id: Uuid::new_v4(),
            reviewer_id: Uuid::new_v4(),
            reviewee_id: Uuid::new_v4(),
            overall_rating: rating,
            punctuality_rating: None,
            quality_rating: None,
            communication_rating: None,
            would_recommend: recommend,
            comment: None,
            is_public: true,
            created_at: None,
        }
    }

    #[test]
    fn test_aggregate_of_three_reviews() {
        let aggregate = aggregate_reviews(&[review(4, true), review(5, true), review(3, false)]);
        assert_eq!(
            aggregate,
            ReviewAggregate {
                total_reviews: 3,
                average_rating: 4.0,
                would_recommend_percentage: 67,
            }
        );
    }

    #[test]
    fn test_average_rounds_to_two_places() {
        let aggregate = aggregate_reviews(&[review(5, true), review(4, true), review(4, false)]);
        assert_eq!(aggregate.average_rating, 4.33);
        assert_eq!(aggregate.would_recommend_percentage, 67);
    }

    #[test]
    fn test_half_cent_average_rounds_up() {
        // 39 x 1 + 1 x 2 = 41 over 40 reviews, a mean of exactly 1.025
        let mut reviews: Vec<Review> = (0..39).map(|_| review(1, false)).collect();
        reviews.push(review(2, false));

        let aggregate = aggregate_reviews(&reviews);
        assert_eq!(aggregate.total_reviews, 40);
        assert_eq!(aggregate.average_rating, 1.03);
    }

    #[test]
    fn test_half_percent_recommendation_rounds_up() {
        // 1 of 8 is 12.5%
        let mut reviews: Vec<Review> = (0..7).map(|_| review(4, false)).collect();
        reviews.push(review(4, true));

        assert_eq!(aggregate_reviews(&reviews).would_recommend_percentage, 13);
    }

    #[test]
    fn test_empty_reviews_yield_zeros() {
        let aggregate = aggregate_reviews(&[]);
        assert_eq!(aggregate.total_reviews, 0);
        assert_eq!(aggregate.average_rating, 0.0);
        assert_eq!(aggregate.would_recommend_percentage, 0);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let forward = aggregate_reviews(&[review(1, false), review(2, true), review(5, true)]);
        let backward = aggregate_reviews(&[review(5, true), review(2, true), review(1, false)]);
        assert_eq!(forward, backward);
        assert_eq!(forward.would_recommend_percentage, 67);
    }
}
