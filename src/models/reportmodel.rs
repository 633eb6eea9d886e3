use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Worker payouts over released payments, bucketed by `released_at`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarningsSummary {
    pub lifetime: BigDecimal,
    pub this_month: BigDecimal,
    pub this_week: BigDecimal,
    pub paid_shifts: i64,
    pub pending_payout: BigDecimal,
}

/// Platform fee income over released payments, bucketed by `released_at`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RevenueSummary {
    pub lifetime_fees: BigDecimal,
    pub month_fees: BigDecimal,
    pub week_fees: BigDecimal,
    pub lifetime_volume: BigDecimal,
    pub released_payments: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReportWindows {
    pub generated_at: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
}
