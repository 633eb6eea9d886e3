// db/shiftdb.rs
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::shiftmodel::*;

#[async_trait]
pub trait ShiftExt {
    // Shifts
    async fn create_shift(&self, shift: NewShift) -> Result<Shift, Error>;

    async fn get_shift(&self, shift_id: Uuid) -> Result<Option<Shift>, Error>;

    async fn list_shifts(
        &self,
        status: Option<ShiftStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Shift>, Error>;

    async fn get_employer_shifts(&self, employer_id: Uuid) -> Result<Vec<Shift>, Error>;

    async fn get_worker_shifts(&self, worker_id: Uuid) -> Result<Vec<Shift>, Error>;

    async fn get_rota_shifts(&self, rota_id: Uuid) -> Result<Vec<Shift>, Error>;

    /// Shifts whose stored status the reconciliation pass may correct.
    async fn get_reconcilable_shifts(&self) -> Result<Vec<Shift>, Error>;

    /// Compare-and-set on status. Returns `None` when the stored status
    /// (NULL read as open) no longer equals `expected`.
    async fn update_shift_status(
        &self,
        shift_id: Uuid,
        expected: ShiftStatus,
        next: ShiftStatus,
    ) -> Result<Option<Shift>, Error>;

    // Applications
    async fn create_application(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
        cover_note: Option<String>,
    ) -> Result<Option<ShiftApplication>, Error>;

    async fn get_application(&self, application_id: Uuid) -> Result<Option<ShiftApplication>, Error>;

    async fn get_shift_applications(&self, shift_id: Uuid) -> Result<Vec<ShiftApplication>, Error>;

    async fn get_worker_applications(&self, worker_id: Uuid) -> Result<Vec<ShiftApplication>, Error>;

    async fn get_worker_application_for_shift(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<ShiftApplication>, Error>;

    async fn count_approved_applications(&self, shift_id: Uuid) -> Result<i64, Error>;

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ShiftApplication, Error>;

    // Timesheets
    /// Inserts the clock-in row; `None` when the worker already has a
    /// timesheet for this shift.
    async fn create_timesheet(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
        clock_in_time: DateTime<Utc>,
    ) -> Result<Option<Timesheet>, Error>;

    async fn get_timesheet(&self, timesheet_id: Uuid) -> Result<Option<Timesheet>, Error>;

    async fn get_worker_timesheet_for_shift(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Timesheet>, Error>;

    async fn get_shift_timesheets(&self, shift_id: Uuid) -> Result<Vec<Timesheet>, Error>;

    async fn get_timesheets_for_shifts(&self, shift_ids: &[Uuid]) -> Result<Vec<Timesheet>, Error>;

    async fn record_clock_out(
        &self,
        timesheet_id: Uuid,
        clock_out_time: DateTime<Utc>,
        regular_hours: BigDecimal,
        overtime_hours: BigDecimal,
    ) -> Result<Option<Timesheet>, Error>;

    async fn confirm_timesheet(&self, timesheet_id: Uuid) -> Result<Option<Timesheet>, Error>;

    async fn mark_timesheet_disputed(
        &self,
        timesheet_id: Uuid,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Timesheet, Error>;
}

#[async_trait]
impl ShiftExt for DBClient {
    async fn create_shift(&self, shift: NewShift) -> Result<Shift, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            INSERT INTO shifts
            (employer_id, rota_id, title, description, location, shift_date,
             start_time, end_time, hourly_rate, overtime_multiplier, workers_needed, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, employer_id, rota_id, title, description, location, shift_date,
                      start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                      status, created_at, updated_at
            "#
        )
        .bind(shift.employer_id)
        .bind(shift.rota_id)
        .bind(shift.title)
        .bind(shift.description)
        .bind(shift.location)
        .bind(shift.shift_date)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(shift.hourly_rate)
        .bind(shift.overtime_multiplier)
        .bind(shift.workers_needed)
        .bind(shift.status)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_shift(&self, shift_id: Uuid) -> Result<Option<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, employer_id, rota_id, title, description, location, shift_date,
                   start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                   status, created_at, updated_at
            FROM shifts
            WHERE id = $1
            "#
        )
        .bind(shift_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_shifts(
        &self,
        status: Option<ShiftStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, employer_id, rota_id, title, description, location, shift_date,
                   start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                   status, created_at, updated_at
            FROM shifts
            WHERE ($1::shift_status IS NULL OR COALESCE(status, 'open'::shift_status) = $1)
            ORDER BY shift_date ASC, start_time ASC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_employer_shifts(&self, employer_id: Uuid) -> Result<Vec<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, employer_id, rota_id, title, description, location, shift_date,
                   start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                   status, created_at, updated_at
            FROM shifts
            WHERE employer_id = $1
            ORDER BY shift_date DESC, start_time DESC
            "#
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_worker_shifts(&self, worker_id: Uuid) -> Result<Vec<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT DISTINCT s.id, s.employer_id, s.rota_id, s.title, s.description, s.location,
                   s.shift_date, s.start_time, s.end_time, s.hourly_rate, s.overtime_multiplier,
                   s.workers_needed, s.status, s.created_at, s.updated_at
            FROM shifts s
            LEFT JOIN shift_applications a
                ON a.shift_id = s.id AND a.worker_id = $1 AND a.status = 'approved'::application_status
            LEFT JOIN timesheets t
                ON t.shift_id = s.id AND t.worker_id = $1
            WHERE a.id IS NOT NULL OR t.id IS NOT NULL
            ORDER BY s.shift_date DESC, s.start_time DESC
            "#
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_rota_shifts(&self, rota_id: Uuid) -> Result<Vec<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, employer_id, rota_id, title, description, location, shift_date,
                   start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                   status, created_at, updated_at
            FROM shifts
            WHERE rota_id = $1
            ORDER BY shift_date ASC, start_time ASC
            "#
        )
        .bind(rota_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_reconcilable_shifts(&self) -> Result<Vec<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, employer_id, rota_id, title, description, location, shift_date,
                   start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                   status, created_at, updated_at
            FROM shifts
            WHERE status IS NULL
               OR status NOT IN ('cancelled'::shift_status, 'draft'::shift_status)
            ORDER BY shift_date DESC
            "#
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn update_shift_status(
        &self,
        shift_id: Uuid,
        expected: ShiftStatus,
        next: ShiftStatus,
    ) -> Result<Option<Shift>, Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            UPDATE shifts
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND COALESCE(status, 'open'::shift_status) = $2
            RETURNING id, employer_id, rota_id, title, description, location, shift_date,
                      start_time, end_time, hourly_rate, overtime_multiplier, workers_needed,
                      status, created_at, updated_at
            "#
        )
        .bind(shift_id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_application(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
        cover_note: Option<String>,
    ) -> Result<Option<ShiftApplication>, Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            INSERT INTO shift_applications (shift_id, worker_id, cover_note)
            VALUES ($1, $2, $3)
            ON CONFLICT (shift_id, worker_id) DO NOTHING
            RETURNING id, shift_id, worker_id, cover_note, status, created_at, updated_at
            "#
        )
        .bind(shift_id)
        .bind(worker_id)
        .bind(cover_note)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_application(&self, application_id: Uuid) -> Result<Option<ShiftApplication>, Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            SELECT id, shift_id, worker_id, cover_note, status, created_at, updated_at
            FROM shift_applications
            WHERE id = $1
            "#
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_shift_applications(&self, shift_id: Uuid) -> Result<Vec<ShiftApplication>, Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            SELECT id, shift_id, worker_id, cover_note, status, created_at, updated_at
            FROM shift_applications
            WHERE shift_id = $1
            ORDER BY created_at ASC
            "#
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_worker_applications(&self, worker_id: Uuid) -> Result<Vec<ShiftApplication>, Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            SELECT id, shift_id, worker_id, cover_note, status, created_at, updated_at
            FROM shift_applications
            WHERE worker_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_worker_application_for_shift(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<ShiftApplication>, Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            SELECT id, shift_id, worker_id, cover_note, status, created_at, updated_at
            FROM shift_applications
            WHERE shift_id = $1 AND worker_id = $2
            "#
        )
        .bind(shift_id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_approved_applications(&self, shift_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM shift_applications
            WHERE shift_id = $1 AND status = 'approved'::application_status
            "#
        )
        .bind(shift_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ShiftApplication, Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            UPDATE shift_applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, shift_id, worker_id, cover_note, status, created_at, updated_at
            "#
        )
        .bind(application_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_timesheet(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
        clock_in_time: DateTime<Utc>,
    ) -> Result<Option<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            INSERT INTO timesheets (shift_id, worker_id, clock_in_time)
            VALUES ($1, $2, $3)
            ON CONFLICT (shift_id, worker_id) DO NOTHING
            RETURNING id, shift_id, worker_id, clock_in_time, clock_out_time,
                      regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                      dispute_raised, created_at
            "#
        )
        .bind(shift_id)
        .bind(worker_id)
        .bind(clock_in_time)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_timesheet(&self, timesheet_id: Uuid) -> Result<Option<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            SELECT id, shift_id, worker_id, clock_in_time, clock_out_time,
                   regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                   dispute_raised, created_at
            FROM timesheets
            WHERE id = $1
            "#
        )
        .bind(timesheet_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_worker_timesheet_for_shift(
        &self,
        shift_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            SELECT id, shift_id, worker_id, clock_in_time, clock_out_time,
                   regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                   dispute_raised, created_at
            FROM timesheets
            WHERE shift_id = $1 AND worker_id = $2
            "#
        )
        .bind(shift_id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_shift_timesheets(&self, shift_id: Uuid) -> Result<Vec<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            SELECT id, shift_id, worker_id, clock_in_time, clock_out_time,
                   regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                   dispute_raised, created_at
            FROM timesheets
            WHERE shift_id = $1
            ORDER BY clock_in_time ASC
            "#
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_timesheets_for_shifts(&self, shift_ids: &[Uuid]) -> Result<Vec<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            SELECT id, shift_id, worker_id, clock_in_time, clock_out_time,
                   regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                   dispute_raised, created_at
            FROM timesheets
            WHERE shift_id = ANY($1)
            "#
        )
        .bind(shift_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn record_clock_out(
        &self,
        timesheet_id: Uuid,
        clock_out_time: DateTime<Utc>,
        regular_hours: BigDecimal,
        overtime_hours: BigDecimal,
    ) -> Result<Option<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            UPDATE timesheets
            SET clock_out_time = $2, regular_hours = $3, overtime_hours = $4
            WHERE id = $1 AND clock_out_time IS NULL
            RETURNING id, shift_id, worker_id, clock_in_time, clock_out_time,
                      regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                      dispute_raised, created_at
            "#
        )
        .bind(timesheet_id)
        .bind(clock_out_time)
        .bind(regular_hours)
        .bind(overtime_hours)
        .fetch_optional(&self.pool)
        .await
    }

    async fn confirm_timesheet(&self, timesheet_id: Uuid) -> Result<Option<Timesheet>, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            UPDATE timesheets
            SET employer_confirmed = TRUE, confirmed_at = NOW()
            WHERE id = $1 AND employer_confirmed = FALSE
            RETURNING id, shift_id, worker_id, clock_in_time, clock_out_time,
                      regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                      dispute_raised, created_at
            "#
        )
        .bind(timesheet_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_timesheet_disputed(
        &self,
        timesheet_id: Uuid,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Timesheet, Error> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            UPDATE timesheets
            SET dispute_raised = TRUE
            WHERE id = $1
            RETURNING id, shift_id, worker_id, clock_in_time, clock_out_time,
                      regular_hours, overtime_hours, employer_confirmed, confirmed_at,
                      dispute_raised, created_at
            "#
        )
        .bind(timesheet_id)
        .fetch_one(&mut **tx)
        .await
    }
}
