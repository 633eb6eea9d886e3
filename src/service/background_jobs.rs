// service/background_jobs.rs
use std::sync::Arc;
use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::AppState;

/// Start background job that repairs stored shift statuses
pub async fn start_reconcile_job(app_state: Arc<AppState>) {
    let every = app_state.env.reconcile_interval_secs.max(60);
    let mut interval = interval(Duration::from_secs(every));

    loop {
        interval.tick().await;

        tracing::info!("Running shift status reconciliation at {}", Utc::now());

        match app_state.reconcile_service.reconcile().await {
            Ok(report) => tracing::info!(
                "Reconciliation completed: {} examined, {} corrected, {} flagged",
                report.examined,
                report.corrected,
                report.flagged.len()
            ),
            Err(e) => tracing::error!("Reconciliation job failed: {}", e),
        }
    }
}
