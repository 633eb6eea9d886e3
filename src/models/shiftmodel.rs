use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "shift_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Draft,
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ShiftStatus {
    #[cfg(test)]
    pub const ALL: [ShiftStatus; 5] = [
        ShiftStatus::Draft,
        ShiftStatus::Open,
        ShiftStatus::InProgress,
        ShiftStatus::Completed,
        ShiftStatus::Cancelled,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            ShiftStatus::Draft => "draft",
            ShiftStatus::Open => "open",
            ShiftStatus::InProgress => "in_progress",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    #[serde(alias = "accepted")]
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    HeldInEscrow,
    Released,
    MockReleased,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::HeldInEscrow => "held_in_escrow",
            PaymentStatus::Released => "released",
            PaymentStatus::MockReleased => "mock_released",
        }
    }

    /// Released and mock-released payments both settle a shift.
    pub fn is_released(&self) -> bool {
        matches!(self, PaymentStatus::Released | PaymentStatus::MockReleased)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "dispute_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    Investigating,
    Resolved,
}

impl DisputeStatus {
    pub fn to_str(&self) -> &str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::Investigating => "investigating",
            DisputeStatus::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "dispute_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    Hours,
    NoShow,
    Conduct,
    Quality,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Shift {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub rota_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hourly_rate: BigDecimal,
    pub overtime_multiplier: BigDecimal,
    pub workers_needed: i32,
    pub status: Option<ShiftStatus>,        // Database has DEFAULT 'open', can be NULL
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Shift {
    /// Unset status reads as open.
    pub fn effective_status(&self) -> ShiftStatus {
        self.status.unwrap_or(ShiftStatus::Open)
    }

    /// Scheduled length in minutes. An end time at or before the start
    /// time means the shift runs past midnight.
    pub fn scheduled_minutes(&self) -> i64 {
        let minutes = (self.end_time - self.start_time).num_minutes();
        if minutes <= 0 {
            minutes + 24 * 60
        } else {
            minutes
        }
    }
}

/// Column values for a shift insert.
#[derive(Debug, Clone)]
pub struct NewShift {
    pub employer_id: Uuid,
    pub rota_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hourly_rate: BigDecimal,
    pub overtime_multiplier: BigDecimal,
    pub workers_needed: i32,
    pub status: ShiftStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShiftApplication {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub worker_id: Uuid,
    pub cover_note: Option<String>,
    pub status: Option<ApplicationStatus>,   // Database has DEFAULT 'pending', can be NULL
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Timesheet {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub worker_id: Uuid,
    pub clock_in_time: DateTime<Utc>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub regular_hours: Option<BigDecimal>,
    pub overtime_hours: Option<BigDecimal>,
    pub employer_confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub dispute_raised: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Timesheet {
    pub fn is_clocked_out(&self) -> bool {
        self.clock_out_time.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dispute {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub raised_by: Uuid,
    pub dispute_type: DisputeType,
    pub reason: String,
    pub description: String,
    pub status: Option<DisputeStatus>,
    pub assigned_admin: Option<Uuid>,
    pub resolution: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Dispute {
    pub fn effective_status(&self) -> DisputeStatus {
        self.status.unwrap_or(DisputeStatus::Open)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub timesheet_id: Uuid,
    pub employer_id: Uuid,
    pub worker_id: Uuid,
    pub regular_amount: BigDecimal,
    pub overtime_amount: BigDecimal,
    pub subtotal: BigDecimal,
    pub platform_fee_percentage: BigDecimal,
    pub platform_fee: BigDecimal,
    pub total_charged: BigDecimal,
    pub worker_payout: BigDecimal,
    pub status: PaymentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub overall_rating: i32,
    pub punctuality_rating: Option<i32>,
    pub quality_rating: Option<i32>,
    pub communication_rating: Option<i32>,
    pub would_recommend: bool,
    pub comment: Option<String>,
    pub is_public: bool,
    pub created_at: Option<DateTime<Utc>>,
}
