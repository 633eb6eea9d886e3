// db/disputedb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::shiftmodel::*;

#[async_trait]
pub trait DisputeExt {
    /// Runs inside the caller's transaction so the timesheet flag can be
    /// set atomically with it.
    async fn create_dispute(
        &self,
        timesheet_id: Uuid,
        raised_by: Uuid,
        dispute_type: DisputeType,
        reason: String,
        description: String,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Dispute, Error>;

    async fn get_dispute(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error>;

    async fn get_active_dispute_for_timesheet(
        &self,
        timesheet_id: Uuid,
    ) -> Result<Option<Dispute>, Error>;

    async fn get_shift_disputes(&self, shift_id: Uuid) -> Result<Vec<Dispute>, Error>;

    async fn list_disputes(&self, status: Option<DisputeStatus>) -> Result<Vec<Dispute>, Error>;

    /// Moves a dispute out of `expected`; `None` when it is no longer there.
    async fn update_dispute_status(
        &self,
        dispute_id: Uuid,
        expected: DisputeStatus,
        next: DisputeStatus,
        admin_id: Uuid,
        resolution: Option<String>,
    ) -> Result<Option<Dispute>, Error>;
}

#[async_trait]
impl DisputeExt for DBClient {
    async fn create_dispute(
        &self,
        timesheet_id: Uuid,
        raised_by: Uuid,
        dispute_type: DisputeType,
        reason: String,
        description: String,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Dispute, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            INSERT INTO disputes (timesheet_id, raised_by, dispute_type, reason, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, timesheet_id, raised_by, dispute_type, reason, description,
                      status, assigned_admin, resolution, created_at, resolved_at
            "#
        )
        .bind(timesheet_id)
        .bind(raised_by)
        .bind(dispute_type)
        .bind(reason)
        .bind(description)
        .fetch_one(&mut **tx)
        .await
    }

    async fn get_dispute(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            SELECT id, timesheet_id, raised_by, dispute_type, reason, description,
                   status, assigned_admin, resolution, created_at, resolved_at
            FROM disputes
            WHERE id = $1
            "#
        )
        .bind(dispute_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_dispute_for_timesheet(
        &self,
        timesheet_id: Uuid,
    ) -> Result<Option<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            SELECT id, timesheet_id, raised_by, dispute_type, reason, description,
                   status, assigned_admin, resolution, created_at, resolved_at
            FROM disputes
            WHERE timesheet_id = $1
              AND COALESCE(status, 'open'::dispute_status) <> 'resolved'::dispute_status
            LIMIT 1
            "#
        )
        .bind(timesheet_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_shift_disputes(&self, shift_id: Uuid) -> Result<Vec<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            SELECT d.id, d.timesheet_id, d.raised_by, d.dispute_type, d.reason, d.description,
                   d.status, d.assigned_admin, d.resolution, d.created_at, d.resolved_at
            FROM disputes d
            JOIN timesheets t ON t.id = d.timesheet_id
            WHERE t.shift_id = $1
            ORDER BY d.created_at DESC
            "#
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_disputes(&self, status: Option<DisputeStatus>) -> Result<Vec<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            SELECT id, timesheet_id, raised_by, dispute_type, reason, description,
                   status, assigned_admin, resolution, created_at, resolved_at
            FROM disputes
            WHERE ($1::dispute_status IS NULL OR COALESCE(status, 'open'::dispute_status) = $1)
            ORDER BY created_at DESC
            "#
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_dispute_status(
        &self,
        dispute_id: Uuid,
        expected: DisputeStatus,
        next: DisputeStatus,
        admin_id: Uuid,
        resolution: Option<String>,
    ) -> Result<Option<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            UPDATE disputes
            SET status = $3,
                assigned_admin = $4,
                resolution = COALESCE($5, resolution),
                resolved_at = CASE WHEN $3 = 'resolved'::dispute_status THEN NOW() ELSE resolved_at END
            WHERE id = $1 AND COALESCE(status, 'open'::dispute_status) = $2
            RETURNING id, timesheet_id, raised_by, dispute_type, reason, description,
                      status, assigned_admin, resolution, created_at, resolved_at
            "#
        )
        .bind(dispute_id)
        .bind(expected)
        .bind(next)
        .bind(admin_id)
        .bind(resolution)
        .fetch_optional(&self.pool)
        .await
    }
}
