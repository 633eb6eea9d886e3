// db/paymentdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use super::query_timeout::QueryTimeout;
use crate::models::{reportmodel::*, shiftmodel::*};
use crate::service::payment_calculator::PaymentBreakdown;

#[async_trait]
pub trait PaymentExt {
    /// Inserts the settlement for a timesheet; `None` when one already
    /// exists for it.
    async fn create_payment(
        &self,
        timesheet: &Timesheet,
        employer_id: Uuid,
        breakdown: &PaymentBreakdown,
    ) -> Result<Option<Payment>, Error>;

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, Error>;

    async fn get_payment_by_timesheet(&self, timesheet_id: Uuid) -> Result<Option<Payment>, Error>;

    async fn get_shift_payments(&self, shift_id: Uuid) -> Result<Vec<Payment>, Error>;

    async fn get_payments_for_shifts(&self, shift_ids: &[Uuid]) -> Result<Vec<Payment>, Error>;

    async fn get_worker_payments(&self, worker_id: Uuid) -> Result<Vec<Payment>, Error>;

    /// Moves a held payment to `status`; `None` when it was not held.
    async fn release_payment(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, Error>;

    async fn get_worker_earnings(
        &self,
        worker_id: Uuid,
        windows: &ReportWindows,
    ) -> Result<EarningsSummary, Error>;

    async fn get_platform_revenue(&self, windows: &ReportWindows) -> Result<RevenueSummary, Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_payment(
        &self,
        timesheet: &Timesheet,
        employer_id: Uuid,
        breakdown: &PaymentBreakdown,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
            (shift_id, timesheet_id, employer_id, worker_id, regular_amount, overtime_amount,
             subtotal, platform_fee_percentage, platform_fee, total_charged, worker_payout, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'held_in_escrow'::payment_status)
            ON CONFLICT (timesheet_id) DO NOTHING
            RETURNING id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                      overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                      total_charged, worker_payout, status, created_at, released_at
            "#
        )
        .bind(timesheet.shift_id)
        .bind(timesheet.id)
        .bind(employer_id)
        .bind(timesheet.worker_id)
        .bind(&breakdown.regular_amount)
        .bind(&breakdown.overtime_amount)
        .bind(&breakdown.subtotal)
        .bind(&breakdown.platform_fee_percentage)
        .bind(&breakdown.platform_fee)
        .bind(&breakdown.total_charged)
        .bind(&breakdown.worker_payout)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                   overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                   total_charged, worker_payout, status, created_at, released_at
            FROM payments
            WHERE id = $1
            "#
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_payment_by_timesheet(&self, timesheet_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                   overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                   total_charged, worker_payout, status, created_at, released_at
            FROM payments
            WHERE timesheet_id = $1
            "#
        )
        .bind(timesheet_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_shift_payments(&self, shift_id: Uuid) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                   overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                   total_charged, worker_payout, status, created_at, released_at
            FROM payments
            WHERE shift_id = $1
            "#
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_payments_for_shifts(&self, shift_ids: &[Uuid]) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                   overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                   total_charged, worker_payout, status, created_at, released_at
            FROM payments
            WHERE shift_id = ANY($1)
            "#
        )
        .bind(shift_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_worker_payments(&self, worker_id: Uuid) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                   overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                   total_charged, worker_payout, status, created_at, released_at
            FROM payments
            WHERE worker_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn release_payment(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, released_at = NOW()
            WHERE id = $1 AND status = 'held_in_escrow'::payment_status
            RETURNING id, shift_id, timesheet_id, employer_id, worker_id, regular_amount,
                      overtime_amount, subtotal, platform_fee_percentage, platform_fee,
                      total_charged, worker_payout, status, created_at, released_at
            "#
        )
        .bind(payment_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_worker_earnings(
        &self,
        worker_id: Uuid,
        windows: &ReportWindows,
    ) -> Result<EarningsSummary, Error> {
        let query = sqlx::query_as::<_, EarningsSummary>(
            r#"
            SELECT
                COALESCE(SUM(worker_payout) FILTER (WHERE status IN ('released', 'mock_released')), 0) AS lifetime,
                COALESCE(SUM(worker_payout) FILTER (WHERE status IN ('released', 'mock_released') AND released_at >= $2), 0) AS this_month,
                COALESCE(SUM(worker_payout) FILTER (WHERE status IN ('released', 'mock_released') AND released_at >= $3), 0) AS this_week,
                COUNT(*) FILTER (WHERE status IN ('released', 'mock_released')) AS paid_shifts,
                COALESCE(SUM(worker_payout) FILTER (WHERE status = 'held_in_escrow'), 0) AS pending_payout
            FROM payments
            WHERE worker_id = $1
            "#
        )
        .bind(worker_id)
        .bind(windows.month_start)
        .bind(windows.week_start)
        .fetch_one(&self.pool);

        QueryTimeout::run(QueryTimeout::AGGREGATION_TIMEOUT, query).await
    }

    async fn get_platform_revenue(&self, windows: &ReportWindows) -> Result<RevenueSummary, Error> {
        let query = sqlx::query_as::<_, RevenueSummary>(
            r#"
            SELECT
                COALESCE(SUM(platform_fee), 0) AS lifetime_fees,
                COALESCE(SUM(platform_fee) FILTER (WHERE released_at >= $1), 0) AS month_fees,
                COALESCE(SUM(platform_fee) FILTER (WHERE released_at >= $2), 0) AS week_fees,
                COALESCE(SUM(total_charged), 0) AS lifetime_volume,
                COUNT(*) AS released_payments
            FROM payments
            WHERE status IN ('released', 'mock_released')
            "#
        )
        .bind(windows.month_start)
        .bind(windows.week_start)
        .fetch_one(&self.pool);

        QueryTimeout::run(QueryTimeout::AGGREGATION_TIMEOUT, query).await
    }
}
