// service/lifecycle.rs
//
// The single place where shift status is decided. Mutation sites gather
// the shift's timesheets, payments and disputes and ask this module what
// the status should be; nothing else writes `shifts.status` by itself.
//
//   draft ──publish──▶ open ──first clock-in──▶ in_progress ──settled──▶ completed
//     │                 │                           │
//     └─────────────────┴───────── cancel ──────────┴──▶ cancelled
//
// "Settled" means every timesheet on the shift is employer-confirmed AND
// has a payment in {released, mock_released}. Disputes never move status.
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::shiftmodel::{Dispute, Payment, Shift, ShiftStatus, Timesheet};

#[derive(Error, Debug, PartialEq)]
pub enum LifecycleError {
    #[error("Cannot move shift from {from} to {to}")]
    InvalidTransition { from: ShiftStatus, to: ShiftStatus },

    #[error("Shift is {0} and no longer accepts clock-ins")]
    ClockInClosed(ShiftStatus),
}

impl ShiftStatus {
    /// Forward transitions of the shift lifecycle.
    pub fn can_transition_to(&self, to: ShiftStatus) -> bool {
        matches!(
            (self, to),
            (ShiftStatus::Draft, ShiftStatus::Open)
                | (ShiftStatus::Open, ShiftStatus::InProgress)
                | (ShiftStatus::InProgress, ShiftStatus::Completed)
                | (ShiftStatus::Draft, ShiftStatus::Cancelled)
                | (ShiftStatus::Open, ShiftStatus::Cancelled)
                | (ShiftStatus::InProgress, ShiftStatus::Cancelled)
        )
    }
}

pub fn validate_transition(from: ShiftStatus, to: ShiftStatus) -> Result<(), LifecycleError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}

/// What the records attached to a shift say about its progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftFacts {
    pub clocked_in: bool,
    pub settled: bool,
}

impl ShiftFacts {
    pub fn from_records(timesheets: &[Timesheet], payments: &[Payment]) -> Self {
        let clocked_in = !timesheets.is_empty();
        let settled = clocked_in
            && timesheets.iter().all(|timesheet| {
                timesheet.employer_confirmed
                    && payments.iter().any(|payment| {
                        payment.timesheet_id == timesheet.id && payment.status.is_released()
                    })
            });

        Self { clocked_in, settled }
    }
}

/// Status a shift should hold after a mutation, given everything
/// recorded against it. Only ever moves forward; terminal and draft
/// shifts are returned unchanged since those moves are explicit actions.
/// Disputes are an orthogonal flag on the timesheet and never move status.
pub fn next_shift_status(
    shift: &Shift,
    timesheets: &[Timesheet],
    payments: &[Payment],
    _disputes: &[Dispute],
) -> ShiftStatus {
    let current = shift.effective_status();
    let facts = ShiftFacts::from_records(timesheets, payments);

    match current {
        ShiftStatus::Draft | ShiftStatus::Completed | ShiftStatus::Cancelled => current,
        // open never jumps straight to completed
        ShiftStatus::Open if facts.clocked_in => ShiftStatus::InProgress,
        ShiftStatus::InProgress if facts.settled => ShiftStatus::Completed,
        ShiftStatus::Open | ShiftStatus::InProgress => current,
    }
}

/// Status a shift's records justify, ignoring what is stored. Used by
/// the reconciliation pass to spot rows written before every mutation
/// went through `next_shift_status`. Cancelled and draft are explicit
/// decisions and are kept.
pub fn derived_shift_status(
    stored: Option<ShiftStatus>,
    timesheets: &[Timesheet],
    payments: &[Payment],
) -> ShiftStatus {
    let stored = stored.unwrap_or(ShiftStatus::Open);
    if matches!(stored, ShiftStatus::Cancelled | ShiftStatus::Draft) {
        return stored;
    }

    let facts = ShiftFacts::from_records(timesheets, payments);
    if facts.settled {
        ShiftStatus::Completed
    } else if facts.clocked_in {
        ShiftStatus::InProgress
    } else {
        ShiftStatus::Open
    }
}

/// Lifecycle steps leading from `from` forward to `to`, each one a valid
/// transition. `None` when `to` is not ahead of `from` on the
/// open → in_progress → completed path.
pub fn forward_steps(from: ShiftStatus, to: ShiftStatus) -> Option<Vec<ShiftStatus>> {
    const PATH: [ShiftStatus; 3] = [ShiftStatus::Open, ShiftStatus::InProgress, ShiftStatus::Completed];

    let start = PATH.iter().position(|status| *status == from)?;
    let end = PATH.iter().position(|status| *status == to)?;
    if end <= start {
        return None;
    }

    let steps = PATH[start + 1..=end].to_vec();
    let mut current = from;
    for step in &steps {
        validate_transition(current, *step).ok()?;
        current = *step;
    }
    Some(steps)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClockInOutcome {
    /// First worker on an open shift; the shift moves to in_progress.
    StartShift,
    /// Another worker joins a shift that is already running.
    JoinRunningShift,
    /// Repeat clock-in; the existing timesheet is returned untouched.
    AlreadyClockedIn { timesheet_id: Uuid },
}

impl ClockInOutcome {
    pub fn creates_timesheet(&self) -> bool {
        !matches!(self, ClockInOutcome::AlreadyClockedIn { .. })
    }
}

pub fn decide_clock_in(
    status: Option<ShiftStatus>,
    existing: Option<&Timesheet>,
) -> Result<ClockInOutcome, LifecycleError> {
    if let Some(timesheet) = existing {
        return Ok(ClockInOutcome::AlreadyClockedIn { timesheet_id: timesheet.id });
    }

    match status.unwrap_or(ShiftStatus::Open) {
        ShiftStatus::Open => Ok(ClockInOutcome::StartShift),
        ShiftStatus::InProgress => Ok(ClockInOutcome::JoinRunningShift),
        closed => Err(LifecycleError::ClockInClosed(closed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use crate::models::shiftmodel::{DisputeStatus, DisputeType, PaymentStatus};

    fn shift(status: Option<ShiftStatus>) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            rota_id: None,
            title: "Warehouse picker".to_string(),
            description: "Pick and pack orders".to_string(),
            location: "Leeds".to_string(),
            shift_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            hourly_rate: BigDecimal::from(20),
            overtime_multiplier: BigDecimal::from(1),
            workers_needed: 1,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    fn timesheet(shift: &Shift, confirmed: bool) -> Timesheet {
        Timesheet {
            id: Uuid::new_v4(),
            shift_id: shift.id,
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
            regular_amount: BigDecimal::from(160),
            overtime_amount: BigDecimal::from(0),
            subtotal: BigDecimal::from(160),
            platform_fee_percentage: BigDecimal::from(0),
            platform_fee: BigDecimal::from(0),
            total_charged: BigDecimal::from(160),
            worker_payout: BigDecimal::from(160),
            status,
            created_at: None,
            released_at: None,
        }
    }

    fn dispute(timesheet: &Timesheet, status: DisputeStatus) -> Dispute {
        Dispute {
            id: Uuid::new_v4(),
            timesheet_id: timesheet.id,
            raised_by: Uuid::new_v4(),
            dispute_type: DisputeType::Hours,
            reason: "Hours overstated".to_string(),
            description: "Worker left at 15:00".to_string(),
            status: Some(status),
            assigned_admin: None,
            resolution: None,
            created_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_only_lifecycle_edges_are_reachable() {
        let allowed = [
            (ShiftStatus::Draft, ShiftStatus::Open),
            (ShiftStatus::Open, ShiftStatus::InProgress),
            (ShiftStatus::InProgress, ShiftStatus::Completed),
            (ShiftStatus::Draft, ShiftStatus::Cancelled),
            (ShiftStatus::Open, ShiftStatus::Cancelled),
            (ShiftStatus::InProgress, ShiftStatus::Cancelled),
        ];

        for from in ShiftStatus::ALL {
            for to in ShiftStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    validate_transition(from, to).is_ok(),
                    expected,
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in ShiftStatus::ALL {
            assert!(!ShiftStatus::Completed.can_transition_to(to));
            assert!(!ShiftStatus::Cancelled.can_transition_to(to));
        }
    }

    #[test]
    fn test_null_status_reads_as_open() {
        let s = shift(None);
        assert_eq!(s.effective_status(), ShiftStatus::Open);
        assert_eq!(next_shift_status(&s, &[], &[], &[]), ShiftStatus::Open);
    }

    #[test]
    fn test_clock_in_starts_shift() {
        let s = shift(Some(ShiftStatus::Open));
        let ts = timesheet(&s, false);
        assert_eq!(next_shift_status(&s, &[ts], &[], &[]), ShiftStatus::InProgress);
    }

    #[test]
    fn test_completion_requires_confirmation_and_release() {
        let s = shift(Some(ShiftStatus::InProgress));

        for confirmed in [false, true] {
            for status in [None, Some(PaymentStatus::HeldInEscrow), Some(PaymentStatus::Released), Some(PaymentStatus::MockReleased)] {
                let ts = timesheet(&s, confirmed);
                let payments: Vec<Payment> = status.map(|st| payment(&ts, st)).into_iter().collect();
                let released = status.map(|st| st.is_released()).unwrap_or(false);

                let next = next_shift_status(&s, &[ts], &payments, &[]);
                if confirmed && released {
                    assert_eq!(next, ShiftStatus::Completed);
                } else {
                    assert_eq!(next, ShiftStatus::InProgress, "confirmed={} payment={:?}", confirmed, status);
                }
            }
        }
    }

    #[test]
    fn test_next_status_is_always_a_lifecycle_step() {
        for status in ShiftStatus::ALL {
            let s = shift(Some(status));
            let ts = timesheet(&s, true);
            let payments = vec![payment(&ts, PaymentStatus::Released)];

            let next = next_shift_status(&s, &[ts], &payments, &[]);
            assert!(next == status || validate_transition(status, next).is_ok());
        }
    }

    #[test]
    fn test_confirmed_timesheet_without_payment_does_not_complete() {
        let s = shift(Some(ShiftStatus::InProgress));
        let ts = timesheet(&s, true);
        assert_eq!(next_shift_status(&s, &[ts], &[], &[]), ShiftStatus::InProgress);
    }

    #[test]
    fn test_payment_for_other_timesheet_does_not_settle() {
        let s = shift(Some(ShiftStatus::InProgress));
        let first = timesheet(&s, true);
        let second = timesheet(&s, true);
        let payments = vec![payment(&first, PaymentStatus::Released)];

        assert_eq!(
            next_shift_status(&s, &[first, second], &payments, &[]),
            ShiftStatus::InProgress
        );
    }

    #[test]
    fn test_disputes_never_change_status() {
        for status in [ShiftStatus::Open, ShiftStatus::InProgress, ShiftStatus::Completed] {
            let s = shift(Some(status));
            let ts = timesheet(&s, true);
            let payments = vec![payment(&ts, PaymentStatus::Released)];
            let without = next_shift_status(&s, &[ts.clone()], &payments, &[]);

            for dispute_status in [DisputeStatus::Open, DisputeStatus::Investigating, DisputeStatus::Resolved] {
                let disputes = vec![dispute(&ts, dispute_status)];
                assert_eq!(next_shift_status(&s, &[ts.clone()], &payments, &disputes), without);
            }
        }
    }

    #[test]
    fn test_cancelled_and_draft_are_left_alone() {
        for status in [ShiftStatus::Cancelled, ShiftStatus::Draft] {
            let s = shift(Some(status));
            let ts = timesheet(&s, true);
            let payments = vec![payment(&ts, PaymentStatus::Released)];
            assert_eq!(next_shift_status(&s, &[ts], &payments, &[]), status);
        }
    }

    #[test]
    fn test_derived_status_repairs_premature_completion() {
        let s = shift(Some(ShiftStatus::Completed));
        let ts = timesheet(&s, true);
        let held = vec![payment(&ts, PaymentStatus::HeldInEscrow)];
        assert_eq!(
            derived_shift_status(s.status, &[ts.clone()], &held),
            ShiftStatus::InProgress
        );

        let released = vec![payment(&ts, PaymentStatus::MockReleased)];
        assert_eq!(
            derived_shift_status(Some(ShiftStatus::InProgress), &[ts], &released),
            ShiftStatus::Completed
        );

        assert_eq!(
            derived_shift_status(Some(ShiftStatus::InProgress), &[], &[]),
            ShiftStatus::Open
        );
        assert_eq!(
            derived_shift_status(Some(ShiftStatus::Cancelled), &[], &[]),
            ShiftStatus::Cancelled
        );
    }

    #[test]
    fn test_forward_steps_walk_the_lifecycle() {
        assert_eq!(
            forward_steps(ShiftStatus::Open, ShiftStatus::Completed),
            Some(vec![ShiftStatus::InProgress, ShiftStatus::Completed])
        );
        assert_eq!(
            forward_steps(ShiftStatus::InProgress, ShiftStatus::Completed),
            Some(vec![ShiftStatus::Completed])
        );
        assert_eq!(forward_steps(ShiftStatus::Completed, ShiftStatus::InProgress), None);
        assert_eq!(forward_steps(ShiftStatus::InProgress, ShiftStatus::Open), None);
        assert_eq!(forward_steps(ShiftStatus::Open, ShiftStatus::Open), None);
        assert_eq!(forward_steps(ShiftStatus::Draft, ShiftStatus::InProgress), None);
        assert_eq!(forward_steps(ShiftStatus::Cancelled, ShiftStatus::Completed), None);

        for from in ShiftStatus::ALL {
            for to in ShiftStatus::ALL {
                if let Some(steps) = forward_steps(from, to) {
                    let mut current = from;
                    for step in steps {
                        assert!(validate_transition(current, step).is_ok(), "{} -> {}", current, step);
                        current = step;
                    }
                    assert_eq!(current, to);
                }
            }
        }
    }

    #[test]
    fn test_clock_in_decisions() {
        let s = shift(Some(ShiftStatus::Open));
        let ts = timesheet(&s, false);

        assert_eq!(decide_clock_in(None, None), Ok(ClockInOutcome::StartShift));
        assert_eq!(
            decide_clock_in(Some(ShiftStatus::InProgress), None),
            Ok(ClockInOutcome::JoinRunningShift)
        );
        assert_eq!(
            decide_clock_in(Some(ShiftStatus::InProgress), Some(&ts)),
            Ok(ClockInOutcome::AlreadyClockedIn { timesheet_id: ts.id })
        );
        assert_eq!(
            decide_clock_in(Some(ShiftStatus::Cancelled), None),
            Err(LifecycleError::ClockInClosed(ShiftStatus::Cancelled))
        );
        assert_eq!(
            decide_clock_in(Some(ShiftStatus::Draft), None),
            Err(LifecycleError::ClockInClosed(ShiftStatus::Draft))
        );
    }

    #[test]
    fn test_repeat_clock_in_has_no_side_effects() {
        let s = shift(Some(ShiftStatus::InProgress));
        let ts = timesheet(&s, false);
        let outcome = decide_clock_in(s.status, Some(&ts)).unwrap();
        assert!(!outcome.creates_timesheet());
    }
}
