use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "rota_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RotaStatus {
    Draft,
    Published,
}

/// A week of internally scheduled shifts, edited as drafts and
/// released to workers in one step.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rota {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub name: String,
    pub week_start: NaiveDate,
    pub status: Option<RotaStatus>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Rota {
    pub fn is_published(&self) -> bool {
        self.status == Some(RotaStatus::Published)
    }
}
