// service/rota_service.rs
use chrono::{Datelike, Weekday};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, rotadb::RotaExt, shiftdb::ShiftExt},
    dtos::shiftdtos::{CreateRotaDto, CreateShiftDto},
    models::{rotamodel::Rota, shiftmodel::*, usermodel::Profile},
    service::{error::ServiceError, lifecycle::validate_transition, shift_service::ShiftService},
};

#[derive(Debug, Serialize)]
pub struct RotaWithShifts {
    pub rota: Rota,
    pub shifts: Vec<Shift>,
}

fn ensure_rota_owner(rota: &Rota, employer_id: Uuid) -> Result<(), ServiceError> {
    if rota.employer_id != employer_id {
        return Err(ServiceError::UnauthorizedRotaAccess(employer_id, rota.id));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RotaService {
    db_client: Arc<DBClient>,
    shift_service: Arc<ShiftService>,
}

impl RotaService {
    pub fn new(db_client: Arc<DBClient>, shift_service: Arc<ShiftService>) -> Self {
        Self {
            db_client,
            shift_service,
        }
    }

    async fn load_owned_rota(&self, rota_id: Uuid, employer_id: Uuid) -> Result<Rota, ServiceError> {
        let rota = self
            .db_client
            .get_rota(rota_id)
            .await?
            .ok_or(ServiceError::RotaNotFound(rota_id))?;

        ensure_rota_owner(&rota, employer_id)?;
        Ok(rota)
    }

    pub async fn create_rota(&self, employer: &Profile, body: CreateRotaDto) -> Result<Rota, ServiceError> {
        if employer.is_suspended() {
            return Err(ServiceError::AccountSuspended(employer.id));
        }
        if body.week_start.weekday() != Weekday::Mon {
            return Err(ServiceError::Validation("A rota week must start on a Monday".to_string()));
        }

        let rota = self
            .db_client
            .create_rota(employer.id, body.name, body.week_start)
            .await?;

        tracing::info!("Rota {} created by employer {} for week {}", rota.id, employer.id, rota.week_start);
        Ok(rota)
    }

    /// Adds a draft shift to an unpublished rota.
    pub async fn add_shift(
        &self,
        rota_id: Uuid,
        employer: &Profile,
        body: CreateShiftDto,
    ) -> Result<Shift, ServiceError> {
        let rota = self.load_owned_rota(rota_id, employer.id).await?;
        if rota.is_published() {
            return Err(ServiceError::Conflict("Rota has already been published".to_string()));
        }

        self.shift_service.create_shift(employer, body, Some(rota_id)).await
    }

    pub async fn get_rota(&self, rota_id: Uuid, employer_id: Uuid) -> Result<RotaWithShifts, ServiceError> {
        let rota = self.load_owned_rota(rota_id, employer_id).await?;
        let shifts = self.db_client.get_rota_shifts(rota_id).await?;
        Ok(RotaWithShifts { rota, shifts })
    }

    pub async fn get_employer_rotas(&self, employer_id: Uuid) -> Result<Vec<Rota>, ServiceError> {
        Ok(self.db_client.get_employer_rotas(employer_id).await?)
    }

    /// Opens every draft shift on the rota. Publishing a published rota
    /// returns it unchanged.
    pub async fn publish_rota(&self, rota_id: Uuid, employer_id: Uuid) -> Result<RotaWithShifts, ServiceError> {
        let rota = self.load_owned_rota(rota_id, employer_id).await?;
        let shifts = self.db_client.get_rota_shifts(rota_id).await?;

        if rota.is_published() {
            return Ok(RotaWithShifts { rota, shifts });
        }
        if shifts.is_empty() {
            return Err(ServiceError::Validation(
                "Cannot publish a rota with no shifts".to_string(),
            ));
        }

        let mut opened = 0;
        for shift in shifts.iter().filter(|s| s.effective_status() == ShiftStatus::Draft) {
            validate_transition(ShiftStatus::Draft, ShiftStatus::Open)?;
            if self
                .db_client
                .update_shift_status(shift.id, ShiftStatus::Draft, ShiftStatus::Open)
                .await?
                .is_some()
            {
                opened += 1;
            }
        }

        let rota = match self.db_client.mark_rota_published(rota_id).await? {
            Some(rota) => rota,
            None => self
                .db_client
                .get_rota(rota_id)
                .await?
                .ok_or(ServiceError::RotaNotFound(rota_id))?,
        };

        tracing::info!("Rota {} published, {} shifts opened", rota_id, opened);

        let shifts = self.db_client.get_rota_shifts(rota_id).await?;
        Ok(RotaWithShifts { rota, shifts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use crate::models::rotamodel::RotaStatus;

    fn rota(employer_id: Uuid) -> Rota {
        Rota {
            id: Uuid::new_v4(),
            employer_id,
            name: "Week 12 bar cover".to_string(),
            week_start: NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            status: Some(RotaStatus::Draft),
            published_at: None,
            created_at: None,
        }
    }

    #[test]
    fn test_owner_may_manage_rota() {
        let owner = Uuid::new_v4();
        assert!(ensure_rota_owner(&rota(owner), owner).is_ok());
    }

    #[test]
    fn test_other_employer_is_forbidden() {
        let r = rota(Uuid::new_v4());
        let intruder = Uuid::new_v4();

        let err = ensure_rota_owner(&r, intruder).unwrap_err();
        assert!(matches!(err, ServiceError::UnauthorizedRotaAccess(who, id) if who == intruder && id == r.id));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
