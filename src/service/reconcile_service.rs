// service/reconcile_service.rs
//
// Periodic repair of stored shift statuses. Rows written before every
// mutation went through the lifecycle module can disagree with their
// timesheets and payments. A shift that lags behind its records is walked
// forward one lifecycle step at a time; a shift that is ahead of them is
// only reported, since no lifecycle edge leads backwards.
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, paymentdb::PaymentExt, shiftdb::ShiftExt},
    models::shiftmodel::*,
    service::{
        error::ServiceError,
        lifecycle::{derived_shift_status, forward_steps, validate_transition},
    },
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCorrection {
    pub shift_id: Uuid,
    pub from: Option<ShiftStatus>,
    pub to: ShiftStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub examined: usize,
    pub corrected: usize,
    pub changes: Vec<StatusCorrection>,
    /// Shifts whose stored status is ahead of their records. Left for an
    /// admin to resolve.
    pub flagged: Vec<StatusCorrection>,
}

/// Corrections needed for `shifts`, given every timesheet and payment
/// attached to them. Unset statuses that already read as correct are
/// left alone.
pub fn plan_corrections(
    shifts: &[Shift],
    timesheets: &[Timesheet],
    payments: &[Payment],
) -> Vec<StatusCorrection> {
    let mut timesheets_by_shift: HashMap<Uuid, Vec<Timesheet>> = HashMap::new();
    for timesheet in timesheets {
        timesheets_by_shift
            .entry(timesheet.shift_id)
            .or_default()
            .push(timesheet.clone());
    }
    let mut payments_by_shift: HashMap<Uuid, Vec<Payment>> = HashMap::new();
    for payment in payments {
        payments_by_shift
            .entry(payment.shift_id)
            .or_default()
            .push(payment.clone());
    }

    shifts
        .iter()
        .filter_map(|shift| {
            let derived = derived_shift_status(
                shift.status,
                timesheets_by_shift.get(&shift.id).map(Vec::as_slice).unwrap_or(&[]),
                payments_by_shift.get(&shift.id).map(Vec::as_slice).unwrap_or(&[]),
            );
            (derived != shift.effective_status()).then(|| StatusCorrection {
                shift_id: shift.id,
                from: shift.status,
                to: derived,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ReconcileService {
    db_client: Arc<DBClient>,
}

impl ReconcileService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn reconcile(&self) -> Result<ReconcileReport, ServiceError> {
        let shifts = self.db_client.get_reconcilable_shifts().await?;
        let shift_ids: Vec<Uuid> = shifts.iter().map(|shift| shift.id).collect();

        let timesheets = self.db_client.get_timesheets_for_shifts(&shift_ids).await?;
        let payments = self.db_client.get_payments_for_shifts(&shift_ids).await?;

        let mut report = ReconcileReport {
            examined: shifts.len(),
            ..Default::default()
        };

        for correction in plan_corrections(&shifts, &timesheets, &payments) {
            let expected = correction.from.unwrap_or(ShiftStatus::Open);
            let Some(steps) = forward_steps(expected, correction.to) else {
                tracing::warn!(
                    "Shift {} is stored as {} but its records only justify {}, flagged for review",
                    correction.shift_id,
                    expected,
                    correction.to
                );
                report.flagged.push(correction);
                continue;
            };

            if self.advance(correction.shift_id, expected, &steps).await? {
                tracing::info!(
                    "Reconciled shift {}: {} -> {}",
                    correction.shift_id,
                    expected,
                    correction.to
                );
                report.corrected += 1;
                report.changes.push(correction);
            }
        }

        Ok(report)
    }

    /// Applies `steps` in order, each as a compare-and-set from the
    /// previous status. Stops at the first step another writer beat us to.
    async fn advance(
        &self,
        shift_id: Uuid,
        from: ShiftStatus,
        steps: &[ShiftStatus],
    ) -> Result<bool, ServiceError> {
        let mut current = from;
        for &step in steps {
            validate_transition(current, step)?;
            if self
                .db_client
                .update_shift_status(shift_id, current, step)
                .await?
                .is_none()
            {
                tracing::debug!("Shift {} changed during reconciliation, skipped", shift_id);
                return Ok(false);
            }
            current = step;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn shift(status: Option<ShiftStatus>) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            rota_id: None,
            title: "Kitchen porter".to_string(),
            description: String::new(),
            location: "Bristol".to_string(),
            shift_date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            hourly_rate: BigDecimal::from(12),
            overtime_multiplier: BigDecimal::from(1),
            workers_needed: 1,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    fn timesheet(shift_id: Uuid, confirmed: bool) -> Timesheet {
        Timesheet {
            id: Uuid::new_v4(),
            shift_id,
            worker_id: Uuid::new_v4(),
            clock_in_time: Utc::now(),
            clock_out_time: Some(Utc::now()),
            regular_hours: Some(BigDecimal::from(8)),
            overtime_hours: Some(BigDecimal::from(0)),
            employer_confirmed: confirmed,
            confirmed_at: None,
            dispute_raised: false,
            created_at: None,
        }
    }

    fn payment(timesheet: &Timesheet, status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            shift_id: timesheet.shift_id,
            timesheet_id: timesheet.id,
            employer_id: Uuid::new_v4(),
            worker_id: timesheet.worker_id,
            regular_amount: BigDecimal::from(96),
            overtime_amount: BigDecimal::from(0),
            subtotal: BigDecimal::from(96),
            platform_fee_percentage: BigDecimal::from(0),
            platform_fee: BigDecimal::from(0),
            total_charged: BigDecimal::from(96),
            worker_payout: BigDecimal::from(96),
            status,
            created_at: None,
            released_at: None,
        }
    }

    #[test]
    fn test_premature_completion_is_detected() {
        let done = shift(Some(ShiftStatus::Completed));
        let ts = timesheet(done.id, true);
        let held = payment(&ts, PaymentStatus::HeldInEscrow);

        let changes = plan_corrections(&[done.clone()], &[ts], &[held]);
        assert_eq!(
            changes,
            vec![StatusCorrection {
                shift_id: done.id,
                from: Some(ShiftStatus::Completed),
                to: ShiftStatus::InProgress,
            }]
        );
    }

    #[test]
    fn test_settled_shift_is_completed() {
        let running = shift(Some(ShiftStatus::InProgress));
        let ts = timesheet(running.id, true);
        let paid = payment(&ts, PaymentStatus::MockReleased);

        let changes = plan_corrections(&[running], &[ts], &[paid]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, ShiftStatus::Completed);
    }

    #[test]
    fn test_consistent_shifts_are_untouched() {
        let unset = shift(None);
        let open = shift(Some(ShiftStatus::Open));
        let running = shift(Some(ShiftStatus::InProgress));
        let ts = timesheet(running.id, false);

        assert!(plan_corrections(&[unset, open, running], &[ts], &[]).is_empty());
    }

    #[test]
    fn test_planned_corrections_are_walked_through_the_lifecycle() {
        // Open with a confirmed, released timesheet: completed is two steps away
        let open = shift(Some(ShiftStatus::Open));
        let ts = timesheet(open.id, true);
        let paid = payment(&ts, PaymentStatus::Released);

        let changes = plan_corrections(&[open.clone()], &[ts], &[paid]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, ShiftStatus::Completed);
        assert!(validate_transition(ShiftStatus::Open, ShiftStatus::Completed).is_err());

        let steps = forward_steps(ShiftStatus::Open, changes[0].to).unwrap();
        assert_eq!(steps, vec![ShiftStatus::InProgress, ShiftStatus::Completed]);
        let mut current = ShiftStatus::Open;
        for step in steps {
            assert!(validate_transition(current, step).is_ok());
            current = step;
        }
    }

    #[test]
    fn test_demotions_are_never_applied() {
        let done = shift(Some(ShiftStatus::Completed));
        let done_ts = timesheet(done.id, true);
        let held = payment(&done_ts, PaymentStatus::HeldInEscrow);
        let running = shift(Some(ShiftStatus::InProgress));

        let changes = plan_corrections(&[done, running], &[done_ts], &[held]);
        assert_eq!(changes.len(), 2);
        for change in changes {
            let from = change.from.unwrap_or(ShiftStatus::Open);
            assert_eq!(forward_steps(from, change.to), None, "{} -> {}", from, change.to);
        }
    }

    #[test]
    fn test_cancelled_shifts_are_never_corrected() {
        let cancelled = shift(Some(ShiftStatus::Cancelled));
        let ts = timesheet(cancelled.id, true);
        let paid = payment(&ts, PaymentStatus::Released);

        assert!(plan_corrections(&[cancelled], &[ts], &[paid]).is_empty());
    }
}
