// service/shift_service.rs
use bigdecimal::BigDecimal;
use chrono::Utc;
use num_traits::Zero;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, disputedb::DisputeExt, paymentdb::PaymentExt, shiftdb::ShiftExt},
    dtos::shiftdtos::*,
    models::{
        shiftmodel::*,
        usermodel::{Profile, UserRole},
    },
    service::{
        error::ServiceError,
        lifecycle::{decide_clock_in, next_shift_status, validate_transition, ClockInOutcome},
        notification_service::NotificationService,
        payment_calculator::{calculate_payment, split_hours, worked_hours, PayoutModel},
    },
    utils::decimal::DecimalHelpers,
};

const DEFAULT_OVERTIME_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Serialize)]
pub struct ClockInResult {
    pub timesheet: Timesheet,
    pub outcome: ClockInOutcome,
}

#[derive(Debug, Serialize)]
pub struct ConfirmationResult {
    pub timesheet: Timesheet,
    pub payment: Payment,
}

/// A timesheet can be confirmed once the worker has clocked out, unless
/// the shift was cancelled; a payment for it could never settle.
fn ensure_confirmable(shift: &Shift, timesheet: &Timesheet) -> Result<(), ServiceError> {
    if shift.effective_status() == ShiftStatus::Cancelled {
        return Err(ServiceError::InvalidShiftStatus(shift.id, ShiftStatus::Cancelled));
    }
    if !timesheet.is_clocked_out() {
        return Err(ServiceError::Validation(
            "Worker has not clocked out yet".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ShiftService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    platform_fee_percentage: BigDecimal,
    payout_model: PayoutModel,
}

impl ShiftService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        platform_fee_percentage: BigDecimal,
        payout_model: PayoutModel,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            platform_fee_percentage,
            payout_model,
        }
    }

    async fn load_shift(&self, shift_id: Uuid) -> Result<Shift, ServiceError> {
        self.db_client
            .get_shift(shift_id)
            .await?
            .ok_or(ServiceError::ShiftNotFound(shift_id))
    }

    async fn load_owned_shift(&self, shift_id: Uuid, employer_id: Uuid) -> Result<Shift, ServiceError> {
        let shift = self.load_shift(shift_id).await?;
        if shift.employer_id != employer_id {
            return Err(ServiceError::UnauthorizedShiftAccess(employer_id, shift_id));
        }
        Ok(shift)
    }

    /// Re-derives the shift's status from its records and writes it if it
    /// moved. Every mutation that touches timesheets or payments ends here.
    pub async fn apply_lifecycle(&self, shift_id: Uuid) -> Result<Shift, ServiceError> {
        let shift = self.load_shift(shift_id).await?;
        let timesheets = self.db_client.get_shift_timesheets(shift_id).await?;
        let payments = self.db_client.get_shift_payments(shift_id).await?;
        let disputes = self.db_client.get_shift_disputes(shift_id).await?;

        let current = shift.effective_status();
        let next = next_shift_status(&shift, &timesheets, &payments, &disputes);
        if next == current {
            return Ok(shift);
        }

        validate_transition(current, next)?;

        match self.db_client.update_shift_status(shift_id, current, next).await? {
            Some(updated) => {
                tracing::info!("Shift {} moved from {} to {}", shift_id, current, next);
                Ok(updated)
            }
            None => {
                // A concurrent request already moved it
                tracing::debug!("Shift {} left {} before this update landed", shift_id, current);
                self.load_shift(shift_id).await
            }
        }
    }

    pub async fn create_shift(
        &self,
        employer: &Profile,
        body: CreateShiftDto,
        rota_id: Option<Uuid>,
    ) -> Result<Shift, ServiceError> {
        if employer.is_suspended() {
            return Err(ServiceError::AccountSuspended(employer.id));
        }
        if body.start_time == body.end_time {
            return Err(ServiceError::Validation(
                "Shift end time must differ from start time".to_string(),
            ));
        }

        let hourly_rate = body
            .hourly_rate
            .to_money()
            .ok_or_else(|| ServiceError::Validation("Hourly rate is not a number".to_string()))?;
        let overtime_multiplier = body
            .overtime_multiplier
            .unwrap_or(DEFAULT_OVERTIME_MULTIPLIER)
            .to_money()
            .ok_or_else(|| ServiceError::Validation("Overtime multiplier is not a number".to_string()))?;

        // Rota shifts stay in draft until the rota is published
        let status = if body.draft || rota_id.is_some() {
            ShiftStatus::Draft
        } else {
            ShiftStatus::Open
        };

        let shift = self
            .db_client
            .create_shift(NewShift {
                employer_id: employer.id,
                rota_id,
                title: body.title,
                description: body.description,
                location: body.location,
                shift_date: body.shift_date,
                start_time: body.start_time,
                end_time: body.end_time,
                hourly_rate,
                overtime_multiplier,
                workers_needed: body.workers_needed.unwrap_or(1),
                status,
            })
            .await?;

        tracing::info!("Shift {} created by employer {} as {}", shift.id, employer.id, status);

        Ok(shift)
    }

    pub async fn list_shifts(&self, query: &ShiftQueryDto) -> Result<Vec<Shift>, ServiceError> {
        let status = query.status.or(Some(ShiftStatus::Open));
        Ok(self
            .db_client
            .list_shifts(status, query.limit(), query.offset())
            .await?)
    }

    pub async fn get_employer_shifts(&self, employer_id: Uuid) -> Result<Vec<Shift>, ServiceError> {
        Ok(self.db_client.get_employer_shifts(employer_id).await?)
    }

    pub async fn get_worker_shifts(&self, worker_id: Uuid) -> Result<Vec<Shift>, ServiceError> {
        Ok(self.db_client.get_worker_shifts(worker_id).await?)
    }

    pub async fn get_shift_details(&self, shift_id: Uuid) -> Result<ShiftDetailsDto, ServiceError> {
        let shift = self.load_shift(shift_id).await?;
        let timesheets = self.db_client.get_shift_timesheets(shift_id).await?;
        let payments = self.db_client.get_shift_payments(shift_id).await?;
        let disputes = self.db_client.get_shift_disputes(shift_id).await?;

        Ok(ShiftDetailsDto {
            status: shift.effective_status(),
            shift,
            timesheets,
            payments,
            disputes,
        })
    }

    /// Publishes a single draft shift.
    pub async fn publish_shift(&self, shift_id: Uuid, employer_id: Uuid) -> Result<Shift, ServiceError> {
        let shift = self.load_owned_shift(shift_id, employer_id).await?;
        let current = shift.effective_status();
        validate_transition(current, ShiftStatus::Open)?;

        let shift = self
            .db_client
            .update_shift_status(shift_id, current, ShiftStatus::Open)
            .await?
            .ok_or_else(|| ServiceError::Conflict("Shift status changed, please retry".to_string()))?;

        tracing::info!("Shift {} published by employer {}", shift_id, employer_id);
        Ok(shift)
    }

    /// Cancels a shift on behalf of its employer or an admin.
    pub async fn cancel_shift(&self, shift_id: Uuid, actor: &Profile) -> Result<Shift, ServiceError> {
        let shift = self.load_shift(shift_id).await?;
        if shift.employer_id != actor.id && !actor.is_admin() {
            return Err(ServiceError::UnauthorizedShiftAccess(actor.id, shift_id));
        }

        let current = shift.effective_status();
        validate_transition(current, ShiftStatus::Cancelled)?;

        let shift = self
            .db_client
            .update_shift_status(shift_id, current, ShiftStatus::Cancelled)
            .await?
            .ok_or_else(|| ServiceError::Conflict("Shift status changed, please retry".to_string()))?;

        tracing::info!("Shift {} cancelled by {} (was {})", shift_id, actor.id, current);
        Ok(shift)
    }

    pub async fn apply_to_shift(
        &self,
        shift_id: Uuid,
        worker: &Profile,
        body: ApplyToShiftDto,
    ) -> Result<ShiftApplication, ServiceError> {
        if worker.is_suspended() {
            return Err(ServiceError::AccountSuspended(worker.id));
        }
        if worker.role != UserRole::Worker {
            return Err(ServiceError::Validation("Only workers can apply to shifts".to_string()));
        }

        let shift = self.load_shift(shift_id).await?;
        if shift.effective_status() != ShiftStatus::Open {
            return Err(ServiceError::InvalidShiftStatus(shift_id, shift.effective_status()));
        }

        let application = self
            .db_client
            .create_application(shift_id, worker.id, body.cover_note)
            .await?
            .ok_or_else(|| ServiceError::Conflict("You have already applied to this shift".to_string()))?;

        tracing::info!("Worker {} applied to shift {}", worker.id, shift_id);
        Ok(application)
    }

    pub async fn get_shift_applications(
        &self,
        shift_id: Uuid,
        employer_id: Uuid,
    ) -> Result<Vec<ShiftApplication>, ServiceError> {
        self.load_owned_shift(shift_id, employer_id).await?;
        Ok(self.db_client.get_shift_applications(shift_id).await?)
    }

    pub async fn get_worker_applications(
        &self,
        worker_id: Uuid,
    ) -> Result<Vec<ShiftApplication>, ServiceError> {
        Ok(self.db_client.get_worker_applications(worker_id).await?)
    }

    pub async fn decide_application(
        &self,
        application_id: Uuid,
        employer_id: Uuid,
        decision: ApplicationStatus,
    ) -> Result<ShiftApplication, ServiceError> {
        if decision == ApplicationStatus::Pending {
            return Err(ServiceError::Validation(
                "Decision must be approved or rejected".to_string(),
            ));
        }

        let application = self
            .db_client
            .get_application(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;
        let shift = self.load_owned_shift(application.shift_id, employer_id).await?;

        let current = application.status.unwrap_or(ApplicationStatus::Pending);
        if current != ApplicationStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Application has already been {}",
                current.to_str()
            )));
        }

        if decision == ApplicationStatus::Approved {
            let approved = self.db_client.count_approved_applications(shift.id).await?;
            if approved >= shift.workers_needed as i64 {
                return Err(ServiceError::Conflict("Shift is already fully staffed".to_string()));
            }
        }

        let application = self
            .db_client
            .update_application_status(application_id, decision)
            .await?;

        tracing::info!(
            "Application {} for shift {} {}",
            application_id,
            shift.id,
            decision.to_str()
        );

        if let Err(e) = self
            .notification_service
            .notify_application_decision(&application, &shift)
            .await
        {
            tracing::warn!("Failed to notify worker {}: {}", application.worker_id, e);
        }

        Ok(application)
    }

    /// Records a worker's arrival. Repeat calls return the existing
    /// timesheet and have no further effect.
    pub async fn clock_in(&self, shift_id: Uuid, worker: &Profile) -> Result<ClockInResult, ServiceError> {
        if worker.is_suspended() {
            return Err(ServiceError::AccountSuspended(worker.id));
        }

        let shift = self.load_shift(shift_id).await?;

        let approved = self
            .db_client
            .get_worker_application_for_shift(shift_id, worker.id)
            .await?
            .map(|application| application.status == Some(ApplicationStatus::Approved))
            .unwrap_or(false);
        if !approved {
            return Err(ServiceError::UnauthorizedShiftAccess(worker.id, shift_id));
        }

        let existing = self
            .db_client
            .get_worker_timesheet_for_shift(shift_id, worker.id)
            .await?;

        let outcome = decide_clock_in(shift.status, existing.as_ref())?;

        let timesheet = match existing {
            Some(timesheet) => timesheet,
            None => match self
                .db_client
                .create_timesheet(shift_id, worker.id, Utc::now())
                .await?
            {
                Some(timesheet) => timesheet,
                None => {
                    // Lost the race to a parallel clock-in from the same worker
                    let timesheet = self
                        .db_client
                        .get_worker_timesheet_for_shift(shift_id, worker.id)
                        .await?
                        .ok_or(ServiceError::TimesheetNotFound(shift_id))?;
                    return Ok(ClockInResult {
                        outcome: ClockInOutcome::AlreadyClockedIn { timesheet_id: timesheet.id },
                        timesheet,
                    });
                }
            },
        };

        if outcome.creates_timesheet() {
            tracing::info!("Worker {} clocked in to shift {}", worker.id, shift_id);
            self.apply_lifecycle(shift_id).await?;
        }

        Ok(ClockInResult { timesheet, outcome })
    }

    pub async fn clock_out(&self, shift_id: Uuid, worker_id: Uuid) -> Result<Timesheet, ServiceError> {
        let shift = self.load_shift(shift_id).await?;
        let timesheet = self
            .db_client
            .get_worker_timesheet_for_shift(shift_id, worker_id)
            .await?
            .ok_or_else(|| ServiceError::Validation("You have not clocked in to this shift".to_string()))?;

        if timesheet.is_clocked_out() {
            return Ok(timesheet);
        }

        let clock_out_time = Utc::now();
        let worked = worked_hours(timesheet.clock_in_time, clock_out_time)?;
        let (regular, overtime) = split_hours(&worked, shift.scheduled_minutes());

        let timesheet = match self
            .db_client
            .record_clock_out(timesheet.id, clock_out_time, regular, overtime)
            .await?
        {
            Some(timesheet) => timesheet,
            None => self
                .db_client
                .get_timesheet(timesheet.id)
                .await?
                .ok_or(ServiceError::TimesheetNotFound(timesheet.id))?,
        };

        tracing::info!(
            "Worker {} clocked out of shift {} after {} hours",
            worker_id,
            shift_id,
            worked
        );

        self.apply_lifecycle(shift_id).await?;
        Ok(timesheet)
    }

    pub async fn get_shift_timesheets(
        &self,
        shift_id: Uuid,
        actor: &Profile,
    ) -> Result<Vec<Timesheet>, ServiceError> {
        let shift = self.load_shift(shift_id).await?;
        let timesheets = self.db_client.get_shift_timesheets(shift_id).await?;

        if shift.employer_id == actor.id || actor.is_admin() {
            return Ok(timesheets);
        }
        Ok(timesheets
            .into_iter()
            .filter(|timesheet| timesheet.worker_id == actor.id)
            .collect())
    }

    /// Employer sign-off on a finished timesheet. Creates the held payment
    /// for it; safe to repeat.
    pub async fn confirm_timesheet(
        &self,
        timesheet_id: Uuid,
        employer_id: Uuid,
    ) -> Result<ConfirmationResult, ServiceError> {
        let timesheet = self
            .db_client
            .get_timesheet(timesheet_id)
            .await?
            .ok_or(ServiceError::TimesheetNotFound(timesheet_id))?;
        let shift = self.load_owned_shift(timesheet.shift_id, employer_id).await?;

        ensure_confirmable(&shift, &timesheet)?;
        if self
            .db_client
            .get_active_dispute_for_timesheet(timesheet_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Timesheet has an unresolved dispute".to_string(),
            ));
        }

        let timesheet = match self.db_client.confirm_timesheet(timesheet_id).await? {
            Some(confirmed) => confirmed,
            None => timesheet,
        };

        let payment = match self.db_client.get_payment_by_timesheet(timesheet_id).await? {
            Some(payment) => payment,
            None => self.create_payment(&shift, &timesheet).await?,
        };

        self.apply_lifecycle(shift.id).await?;

        if let Err(e) = self
            .notification_service
            .notify_timesheet_confirmed(&shift, &payment)
            .await
        {
            tracing::warn!("Failed to notify worker {}: {}", payment.worker_id, e);
        }

        Ok(ConfirmationResult { timesheet, payment })
    }

    async fn create_payment(&self, shift: &Shift, timesheet: &Timesheet) -> Result<Payment, ServiceError> {
        let zero = BigDecimal::zero();
        let breakdown = calculate_payment(
            &shift.hourly_rate,
            &shift.overtime_multiplier,
            timesheet.regular_hours.as_ref().unwrap_or(&zero),
            timesheet.overtime_hours.as_ref().unwrap_or(&zero),
            &self.platform_fee_percentage,
            self.payout_model,
        )?;

        let payment = match self
            .db_client
            .create_payment(timesheet, shift.employer_id, &breakdown)
            .await?
        {
            Some(payment) => payment,
            None => self
                .db_client
                .get_payment_by_timesheet(timesheet.id)
                .await?
                .ok_or(ServiceError::PaymentNotFound(timesheet.id))?,
        };

        tracing::info!(
            "Payment {} held for timesheet {}: subtotal {}, fee {}, payout {} ({})",
            payment.id,
            timesheet.id,
            payment.subtotal,
            payment.platform_fee,
            payment.worker_payout,
            self.payout_model
        );

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{NaiveDate, NaiveTime};

    fn shift(status: Option<ShiftStatus>) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            rota_id: None,
            title: "Bar staff".to_string(),
            description: String::new(),
            location: "Manchester".to_string(),
            shift_date: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            hourly_rate: BigDecimal::from(14),
            overtime_multiplier: BigDecimal::from(1),
            workers_needed: 2,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    fn timesheet(shift: &Shift, clocked_out: bool) -> Timesheet {
        Timesheet {
            id: Uuid::new_v4(),
            shift_id: shift.id,
            worker_id: Uuid::new_v4(),
            clock_in_time: Utc::now(),
            clock_out_time: clocked_out.then(Utc::now),
            regular_hours: clocked_out.then(|| BigDecimal::from(5)),
            overtime_hours: clocked_out.then(BigDecimal::zero),
            employer_confirmed: false,
            confirmed_at: None,
            dispute_raised: false,
            created_at: None,
        }
    }

    #[test]
    fn test_clocked_out_timesheet_is_confirmable() {
        for status in [None, Some(ShiftStatus::InProgress), Some(ShiftStatus::Completed)] {
            let s = shift(status);
            assert!(ensure_confirmable(&s, &timesheet(&s, true)).is_ok());
        }
    }

    #[test]
    fn test_cancelled_shift_rejects_confirmation() {
        let s = shift(Some(ShiftStatus::Cancelled));
        let err = ensure_confirmable(&s, &timesheet(&s, true)).unwrap_err();

        assert!(matches!(err, ServiceError::InvalidShiftStatus(id, ShiftStatus::Cancelled) if id == s.id));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_open_timesheet_rejects_confirmation() {
        let s = shift(Some(ShiftStatus::InProgress));
        let err = ensure_confirmable(&s, &timesheet(&s, false)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
