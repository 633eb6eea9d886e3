// service/notification_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, profiledb::ProfileExt},
    mail::{mails, sendmail::EmailDispatcher},
    models::shiftmodel::*,
    service::error::ServiceError,
};

/// Lifecycle emails. Callers treat failures as non-fatal: a mutation
/// that already committed is never undone because an email bounced.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    dispatcher: Arc<EmailDispatcher>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, dispatcher: Arc<EmailDispatcher>) -> Self {
        Self { db_client, dispatcher }
    }

    async fn recipient(&self, profile_id: Uuid) -> Result<(String, String), ServiceError> {
        let profile = self
            .db_client
            .get_profile(profile_id)
            .await?
            .ok_or(ServiceError::ProfileNotFound(profile_id))?;

        Ok((profile.email, profile.full_name))
    }

    pub async fn notify_application_decision(
        &self,
        application: &ShiftApplication,
        shift: &Shift,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.recipient(application.worker_id).await?;
        let decision = application
            .status
            .unwrap_or(ApplicationStatus::Pending)
            .to_str()
            .to_string();

        tracing::info!(
            "Application decision notification: worker {} {} for shift {}",
            application.worker_id,
            decision,
            shift.id
        );

        mails::send_application_decision_email(
            &self.dispatcher,
            &email,
            &name,
            &shift.title,
            &shift.shift_date.to_string(),
            &decision,
        )
        .await
        .map(|_| ())
        .map_err(|e| ServiceError::Notification(e.to_string()))
    }

    pub async fn notify_timesheet_confirmed(
        &self,
        shift: &Shift,
        payment: &Payment,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.recipient(payment.worker_id).await?;

        tracing::info!(
            "Timesheet confirmed notification: worker {} on shift {}",
            payment.worker_id,
            shift.id
        );

        mails::send_timesheet_confirmed_email(
            &self.dispatcher,
            &email,
            &name,
            &shift.title,
            &shift.shift_date.to_string(),
            &payment.worker_payout.to_string(),
        )
        .await
        .map(|_| ())
        .map_err(|e| ServiceError::Notification(e.to_string()))
    }

    pub async fn notify_payment_released(
        &self,
        shift: &Shift,
        payment: &Payment,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.recipient(payment.worker_id).await?;

        tracing::info!(
            "Payment released notification: payment {} to worker {}",
            payment.id,
            payment.worker_id
        );

        mails::send_payment_released_email(
            &self.dispatcher,
            &email,
            &name,
            &shift.title,
            &payment.worker_payout.to_string(),
        )
        .await
        .map(|_| ())
        .map_err(|e| ServiceError::Notification(e.to_string()))
    }

    pub async fn notify_dispute_opened(
        &self,
        shift: &Shift,
        timesheet: &Timesheet,
        dispute: &Dispute,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.recipient(timesheet.worker_id).await?;
        let dispute_type = serde_json::to_value(dispute.dispute_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "other".to_string());

        tracing::info!(
            "Dispute notification: dispute {} raised on timesheet {}",
            dispute.id,
            timesheet.id
        );

        mails::send_dispute_opened_email(
            &self.dispatcher,
            &email,
            &name,
            &shift.title,
            &dispute_type,
            &dispute.reason,
        )
        .await
        .map(|_| ())
        .map_err(|e| ServiceError::Notification(e.to_string()))
    }
}
