// service/dispute_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, disputedb::DisputeExt, shiftdb::ShiftExt},
    dtos::shiftdtos::{CreateDisputeDto, UpdateDisputeDto},
    models::{shiftmodel::*, usermodel::Profile},
    service::{error::ServiceError, notification_service::NotificationService},
};

/// Admin workflow for disputes: open -> investigating -> resolved, with
/// open -> resolved allowed directly. Resolved is terminal.
pub fn dispute_transition_allowed(from: DisputeStatus, to: DisputeStatus) -> bool {
    matches!(
        (from, to),
        (DisputeStatus::Open, DisputeStatus::Investigating)
            | (DisputeStatus::Open, DisputeStatus::Resolved)
            | (DisputeStatus::Investigating, DisputeStatus::Resolved)
    )
}

/// Disputes hang off timesheets and never write shift status.
#[derive(Debug, Clone)]
pub struct DisputeService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl DisputeService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    pub async fn raise_dispute(
        &self,
        timesheet_id: Uuid,
        employer_id: Uuid,
        body: CreateDisputeDto,
    ) -> Result<Dispute, ServiceError> {
        let timesheet = self
            .db_client
            .get_timesheet(timesheet_id)
            .await?
            .ok_or(ServiceError::TimesheetNotFound(timesheet_id))?;

        let shift = self
            .db_client
            .get_shift(timesheet.shift_id)
            .await?
            .ok_or(ServiceError::ShiftNotFound(timesheet.shift_id))?;

        if shift.employer_id != employer_id {
            return Err(ServiceError::UnauthorizedShiftAccess(employer_id, shift.id));
        }

        if self
            .db_client
            .get_active_dispute_for_timesheet(timesheet_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "This timesheet already has an open dispute".to_string(),
            ));
        }

        let status_before = shift.effective_status();

        let mut tx = self.db_client.pool.begin().await?;

        let dispute = self
            .db_client
            .create_dispute(
                timesheet_id,
                employer_id,
                body.dispute_type,
                body.reason,
                body.description,
                &mut tx,
            )
            .await?;

        let timesheet = self
            .db_client
            .mark_timesheet_disputed(timesheet_id, &mut tx)
            .await?;

        tx.commit().await?;

        let shift = self
            .db_client
            .get_shift(shift.id)
            .await?
            .ok_or(ServiceError::ShiftNotFound(shift.id))?;
        if shift.effective_status() != status_before {
            tracing::error!(
                "Shift {} changed from {} to {} while dispute {} was raised",
                shift.id,
                status_before,
                shift.effective_status(),
                dispute.id
            );
        }

        tracing::info!(
            "Dispute {} raised by employer {} on timesheet {}",
            dispute.id,
            employer_id,
            timesheet_id
        );

        if let Err(e) = self
            .notification_service
            .notify_dispute_opened(&shift, &timesheet, &dispute)
            .await
        {
            tracing::warn!("Failed to notify worker {}: {}", timesheet.worker_id, e);
        }

        Ok(dispute)
    }

    pub async fn update_dispute(
        &self,
        dispute_id: Uuid,
        admin_id: Uuid,
        body: UpdateDisputeDto,
    ) -> Result<Dispute, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        let current = dispute.effective_status();
        if !dispute_transition_allowed(current, body.status) {
            return Err(ServiceError::InvalidDisputeTransition(dispute_id, current, body.status));
        }

        let resolution = body.resolution.filter(|text| !text.trim().is_empty());
        if body.status == DisputeStatus::Resolved && resolution.is_none() {
            return Err(ServiceError::Validation(
                "A resolution is required to resolve a dispute".to_string(),
            ));
        }

        let dispute = self
            .db_client
            .update_dispute_status(dispute_id, current, body.status, admin_id, resolution)
            .await?
            .ok_or_else(|| ServiceError::Conflict("Dispute was updated by someone else".to_string()))?;

        tracing::info!(
            "Dispute {} moved from {} to {} by admin {}",
            dispute_id,
            current.to_str(),
            body.status.to_str(),
            admin_id
        );

        Ok(dispute)
    }

    pub async fn get_dispute(&self, dispute_id: Uuid) -> Result<Dispute, ServiceError> {
        self.db_client
            .get_dispute(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))
    }

    pub async fn list_disputes(
        &self,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<Dispute>, ServiceError> {
        Ok(self.db_client.list_disputes(status).await?)
    }

    pub async fn get_shift_disputes(
        &self,
        shift_id: Uuid,
        actor: &Profile,
    ) -> Result<Vec<Dispute>, ServiceError> {
        let shift = self
            .db_client
            .get_shift(shift_id)
            .await?
            .ok_or(ServiceError::ShiftNotFound(shift_id))?;

        if shift.employer_id != actor.id && !actor.is_admin() {
            return Err(ServiceError::UnauthorizedShiftAccess(actor.id, shift_id));
        }

        Ok(self.db_client.get_shift_disputes(shift_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use sqlx::postgres::PgPoolOptions;
    use crate::models::usermodel::UserRole;

    #[test]
    fn test_admin_workflow_moves_forward_only() {
        assert!(dispute_transition_allowed(DisputeStatus::Open, DisputeStatus::Investigating));
        assert!(dispute_transition_allowed(DisputeStatus::Investigating, DisputeStatus::Resolved));
        assert!(dispute_transition_allowed(DisputeStatus::Open, DisputeStatus::Resolved));

        assert!(!dispute_transition_allowed(DisputeStatus::Investigating, DisputeStatus::Open));
        assert!(!dispute_transition_allowed(DisputeStatus::Open, DisputeStatus::Open));
    }

    #[test]
    fn test_resolved_is_terminal() {
        for to in [DisputeStatus::Open, DisputeStatus::Investigating, DisputeStatus::Resolved] {
            assert!(!dispute_transition_allowed(DisputeStatus::Resolved, to));
        }
    }

    async fn insert_profile(db: &DBClient, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO profiles (id, email, full_name, role) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(format!("{}@example.com", id))
            .bind("Test Profile")
            .bind(role)
            .execute(&db.pool)
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    #[ignore = "needs a migrated Postgres at DATABASE_URL"]
    async fn test_dispute_and_timesheet_flag_commit_together() {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"))
            .await
            .unwrap();
        let db = DBClient::new(pool);

        let employer_id = insert_profile(&db, UserRole::Employer).await;
        let worker_id = insert_profile(&db, UserRole::Worker).await;
        let shift = db
            .create_shift(NewShift {
                employer_id,
                rota_id: None,
                title: "Warehouse picker".to_string(),
                description: String::new(),
                location: "Leeds".to_string(),
                shift_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                hourly_rate: BigDecimal::from(20),
                overtime_multiplier: BigDecimal::from(1),
                workers_needed: 1,
                status: ShiftStatus::InProgress,
            })
            .await
            .unwrap();
        let timesheet = db
            .create_timesheet(shift.id, worker_id, Utc::now())
            .await
            .unwrap()
            .unwrap();

        // Flag update fails: the dispute insert must roll back with it
        let mut tx = db.pool.begin().await.unwrap();
        db.create_dispute(
            timesheet.id,
            employer_id,
            DisputeType::Hours,
            "Hours overstated".to_string(),
            "Left at 15:00".to_string(),
            &mut tx,
        )
        .await
        .unwrap();
        assert!(db.mark_timesheet_disputed(Uuid::new_v4(), &mut tx).await.is_err());
        drop(tx);

        assert!(db.get_active_dispute_for_timesheet(timesheet.id).await.unwrap().is_none());
        assert!(!db.get_timesheet(timesheet.id).await.unwrap().unwrap().dispute_raised);

        let mut tx = db.pool.begin().await.unwrap();
        let dispute = db
            .create_dispute(
                timesheet.id,
                employer_id,
                DisputeType::Hours,
                "Hours overstated".to_string(),
                "Left at 15:00".to_string(),
                &mut tx,
            )
            .await
            .unwrap();
        let flagged = db.mark_timesheet_disputed(timesheet.id, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        assert!(flagged.dispute_raised);
        assert_eq!(
            db.get_active_dispute_for_timesheet(timesheet.id).await.unwrap().map(|d| d.id),
            Some(dispute.id)
        );
        assert_eq!(
            db.get_shift(shift.id).await.unwrap().unwrap().status,
            Some(ShiftStatus::InProgress)
        );

        sqlx::query("DELETE FROM disputes WHERE timesheet_id = $1")
            .bind(timesheet.id)
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM timesheets WHERE id = $1")
            .bind(timesheet.id)
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM shifts WHERE id = $1")
            .bind(shift.id)
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM profiles WHERE id = ANY($1)")
            .bind(vec![employer_id, worker_id])
            .execute(&db.pool)
            .await
            .unwrap();
    }
}
