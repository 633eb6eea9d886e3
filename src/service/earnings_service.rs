// service/earnings_service.rs
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, paymentdb::PaymentExt},
    models::reportmodel::{EarningsSummary, ReportWindows, RevenueSummary},
    service::error::ServiceError,
};

/// Start of the current calendar month and of the current ISO week
/// (Monday 00:00), both in UTC.
pub fn report_windows(now: DateTime<Utc>) -> ReportWindows {
    let today = now.date_naive();
    let midnight = NaiveTime::MIN;

    let month_start = today.with_day(1).unwrap_or(today).and_time(midnight);
    let week_start = (today - Duration::days(today.weekday().num_days_from_monday() as i64))
        .and_time(midnight);

    ReportWindows {
        generated_at: now,
        month_start: Utc.from_utc_datetime(&month_start),
        week_start: Utc.from_utc_datetime(&week_start),
    }
}

#[derive(Debug, Clone)]
pub struct EarningsService {
    db_client: Arc<DBClient>,
}

impl EarningsService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn worker_earnings(&self, worker_id: Uuid) -> Result<EarningsSummary, ServiceError> {
        let windows = report_windows(Utc::now());
        Ok(self.db_client.get_worker_earnings(worker_id, &windows).await?)
    }

    pub async fn platform_revenue(&self) -> Result<RevenueSummary, ServiceError> {
        let windows = report_windows(Utc::now());
        let revenue = self.db_client.get_platform_revenue(&windows).await?;

        tracing::info!(
            "Revenue report: {} lifetime fees over {} released payments",
            revenue.lifetime_fees,
            revenue.released_payments
        );

        Ok(revenue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_midweek_windows() {
        // Thursday
        let windows = report_windows(at(2026, 3, 12, 15, 30));
        assert_eq!(windows.month_start, at(2026, 3, 1, 0, 0));
        assert_eq!(windows.week_start, at(2026, 3, 9, 0, 0));
    }

    #[test]
    fn test_monday_is_its_own_week_start() {
        let windows = report_windows(at(2026, 3, 9, 0, 5));
        assert_eq!(windows.week_start, at(2026, 3, 9, 0, 0));
    }

    #[test]
    fn test_week_may_start_in_previous_month() {
        // Sunday 1 March 2026 belongs to the week starting Monday 23 February
        let windows = report_windows(at(2026, 3, 1, 23, 59));
        assert_eq!(windows.month_start, at(2026, 3, 1, 0, 0));
        assert_eq!(windows.week_start, at(2026, 2, 23, 0, 0));
    }

    #[test]
    fn test_year_boundary() {
        // Friday 1 January 2027
        let windows = report_windows(at(2027, 1, 1, 8, 0));
        assert_eq!(windows.month_start, at(2027, 1, 1, 0, 0));
        assert_eq!(windows.week_start, at(2026, 12, 28, 0, 0));
    }
}
