// service/payment_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, paymentdb::PaymentExt, shiftdb::ShiftExt},
    models::{shiftmodel::*, usermodel::Profile},
    service::{
        error::ServiceError,
        notification_service::NotificationService,
        payment_calculator::{verify_payment, PayoutModel},
        shift_service::ShiftService,
    },
};

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    shift_service: Arc<ShiftService>,
    notification_service: Arc<NotificationService>,
    payout_model: PayoutModel,
}

impl PaymentService {
    pub fn new(
        db_client: Arc<DBClient>,
        shift_service: Arc<ShiftService>,
        notification_service: Arc<NotificationService>,
        payout_model: PayoutModel,
    ) -> Self {
        Self {
            db_client,
            shift_service,
            notification_service,
            payout_model,
        }
    }

    /// Releases a held payment. `mock` records the release without a
    /// payment provider. Releasing twice returns the released row.
    pub async fn release_payment(
        &self,
        payment_id: Uuid,
        actor: &Profile,
        mock: bool,
    ) -> Result<Payment, ServiceError> {
        let payment = self
            .db_client
            .get_payment(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        if payment.employer_id != actor.id && !actor.is_admin() {
            return Err(ServiceError::UnauthorizedShiftAccess(actor.id, payment.shift_id));
        }

        let timesheet = self
            .db_client
            .get_timesheet(payment.timesheet_id)
            .await?
            .ok_or(ServiceError::TimesheetNotFound(payment.timesheet_id))?;
        if !timesheet.employer_confirmed {
            return Err(ServiceError::Validation(
                "Timesheet must be confirmed before payment is released".to_string(),
            ));
        }

        if payment.status.is_released() {
            // Still settle the shift in case the earlier request stopped short
            self.shift_service.apply_lifecycle(payment.shift_id).await?;
            return Ok(payment);
        }

        if !verify_payment(&payment, self.payout_model) {
            tracing::error!(
                "Payment {} amounts do not match a {} breakdown, release blocked",
                payment_id,
                self.payout_model
            );
            return Err(ServiceError::Conflict(
                "Payment amounts do not reconcile with the payout model".to_string(),
            ));
        }

        let status = if mock {
            PaymentStatus::MockReleased
        } else {
            PaymentStatus::Released
        };

        let released = match self.db_client.release_payment(payment_id, status).await? {
            Some(released) => released,
            None => self
                .db_client
                .get_payment(payment_id)
                .await?
                .ok_or(ServiceError::PaymentNotFound(payment_id))?,
        };

        tracing::info!(
            "Payment {} {} by {}: {} to worker {}",
            payment_id,
            released.status.to_str(),
            actor.id,
            released.worker_payout,
            released.worker_id
        );

        let shift = self.shift_service.apply_lifecycle(released.shift_id).await?;

        if let Err(e) = self
            .notification_service
            .notify_payment_released(&shift, &released)
            .await
        {
            tracing::warn!("Failed to notify worker {}: {}", released.worker_id, e);
        }

        Ok(released)
    }

    pub async fn get_shift_payments(
        &self,
        shift_id: Uuid,
        actor: &Profile,
    ) -> Result<Vec<Payment>, ServiceError> {
        let shift = self
            .db_client
            .get_shift(shift_id)
            .await?
            .ok_or(ServiceError::ShiftNotFound(shift_id))?;
        let payments = self.db_client.get_shift_payments(shift_id).await?;

        if shift.employer_id == actor.id || actor.is_admin() {
            return Ok(payments);
        }
        Ok(payments
            .into_iter()
            .filter(|payment| payment.worker_id == actor.id)
            .collect())
    }

    pub async fn get_worker_payments(&self, worker_id: Uuid) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.db_client.get_worker_payments(worker_id).await?)
    }
}
