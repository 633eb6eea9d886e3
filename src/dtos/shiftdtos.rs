use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    shiftmodel::*,
    usermodel::ModerationStatus,
};

//Shift DTOs
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateShiftDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    #[validate(range(min = 0.01, message = "Hourly rate must be positive"))]
    pub hourly_rate: f64,

    #[validate(range(min = 1.0, max = 3.0, message = "Overtime multiplier must be between 1 and 3"))]
    pub overtime_multiplier: Option<f64>,

    #[validate(range(min = 1, max = 100, message = "Workers needed must be between 1 and 100"))]
    pub workers_needed: Option<i32>,

    /// Post as a draft instead of publishing straight away.
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Deserialize)]
pub struct ShiftQueryDto {
    pub status: Option<ShiftStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ShiftQueryDto {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100) as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page.unwrap_or(1).max(1) as i64 - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct ShiftDetailsDto {
    pub shift: Shift,
    pub status: ShiftStatus,
    pub timesheets: Vec<Timesheet>,
    pub payments: Vec<Payment>,
    pub disputes: Vec<Dispute>,
}

//Application DTOs
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ApplyToShiftDto {
    #[validate(length(max = 1000, message = "Cover note must be at most 1000 characters"))]
    pub cover_note: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApplicationDecisionDto {
    pub status: ApplicationStatus,
}

//Dispute DTOs
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateDisputeDto {
    pub dispute_type: DisputeType,

    #[validate(length(min = 3, max = 200, message = "Reason must be between 3 and 200 characters"))]
    pub reason: String,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateDisputeDto {
    pub status: DisputeStatus,

    #[validate(length(min = 3, max = 2000, message = "Resolution must be between 3 and 2000 characters"))]
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DisputeQueryDto {
    pub status: Option<DisputeStatus>,
}

//Review DTOs
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateReviewDto {
    pub reviewee_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Overall rating must be between 1 and 5"))]
    pub overall_rating: i32,

    #[validate(range(min = 1, max = 5, message = "Punctuality rating must be between 1 and 5"))]
    pub punctuality_rating: Option<i32>,

    #[validate(range(min = 1, max = 5, message = "Quality rating must be between 1 and 5"))]
    pub quality_rating: Option<i32>,

    #[validate(range(min = 1, max = 5, message = "Communication rating must be between 1 and 5"))]
    pub communication_rating: Option<i32>,

    #[serde(default)]
    pub would_recommend: bool,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,

    pub is_public: Option<bool>,
}

//Rota DTOs
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateRotaDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub week_start: NaiveDate,
}

//Payment DTOs
#[derive(Debug, Deserialize, Serialize)]
pub struct ReleasePaymentDto {
    /// Record the release without a payment provider.
    #[serde(default)]
    pub mock: bool,
}

//Admin DTOs
#[derive(Debug, Deserialize, Serialize)]
pub struct ModerationDecisionDto {
    pub status: ModerationStatus,
}

#[derive(Debug, Deserialize)]
pub struct ModerationQueryDto {
    pub status: Option<ModerationStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ModerationQueryDto {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200) as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page.unwrap_or(1).max(1) as i64 - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_ratings_are_bounded() {
        let mut review = CreateReviewDto {
            reviewee_id: Uuid::new_v4(),
            overall_rating: 5,
            punctuality_rating: Some(4),
            quality_rating: None,
            communication_rating: None,
            would_recommend: true,
            comment: None,
            is_public: None,
        };
        assert!(review.validate().is_ok());

        review.overall_rating = 0;
        assert!(review.validate().is_err());

        review.overall_rating = 3;
        review.punctuality_rating = Some(6);
        assert!(review.validate().is_err());
    }

    #[test]
    fn test_accepted_is_an_alias_for_approved() {
        let dto: ApplicationDecisionDto = serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert_eq!(dto.status, ApplicationStatus::Approved);
    }

    #[test]
    fn test_shift_query_paging() {
        let query = ShiftQueryDto { status: None, page: Some(3), limit: Some(500) };
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 200);

        let query = ShiftQueryDto { status: None, page: None, limit: None };
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 0);
    }
}
