use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Worker,
    Employer,
    Admin,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Worker => "worker",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "moderation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Suspended,
}

impl ModerationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Suspended => "suspended",
        }
    }
}

/// A marketplace participant. The row id is the auth provider's user id,
/// so the `sub` claim of a session token addresses it directly.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,

    /// Database has DEFAULT 'pending', can be NULL
    pub moderation_status: Option<ModerationStatus>,

    /// Written only by the review aggregate recompute.
    pub average_rating: Option<f64>,
    pub total_reviews: Option<i32>,
    pub would_recommend_percentage: Option<i32>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn is_suspended(&self) -> bool {
        self.moderation_status == Some(ModerationStatus::Suspended)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
