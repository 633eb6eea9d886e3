use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::HttpError,
    models::shiftmodel::*,
    service::{lifecycle::LifecycleError, payment_calculator::PaymentError},
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Profile {0} not found")]
    ProfileNotFound(Uuid),

    #[error("Shift {0} not found")]
    ShiftNotFound(Uuid),

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error("Timesheet {0} not found")]
    TimesheetNotFound(Uuid),

    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("Dispute {0} not found")]
    DisputeNotFound(Uuid),

    #[error("Rota {0} not found")]
    RotaNotFound(Uuid),

    #[error("Shift {0} is {1}")]
    InvalidShiftStatus(Uuid, ShiftStatus),

    #[error("Cannot move dispute {0} from {1:?} to {2:?}")]
    InvalidDisputeTransition(Uuid, DisputeStatus, DisputeStatus),

    #[error("User {0} is not authorized to perform this action on shift {1}")]
    UnauthorizedShiftAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to manage rota {1}")]
    UnauthorizedRotaAccess(Uuid, Uuid),

    #[error("Account {0} is suspended")]
    AccountSuspended(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ProfileNotFound(_)
            | ServiceError::ShiftNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::TimesheetNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::DisputeNotFound(_)
            | ServiceError::RotaNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::Validation(_) | ServiceError::Payment(_) => StatusCode::BAD_REQUEST,

            ServiceError::InvalidShiftStatus(_, _)
            | ServiceError::InvalidDisputeTransition(_, _, _)
            | ServiceError::Lifecycle(_)
            | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::UnauthorizedShiftAccess(_, _)
            | ServiceError::UnauthorizedRotaAccess(_, _)
            | ServiceError::AccountSuspended(_) => StatusCode::FORBIDDEN,

            ServiceError::Database(_) | ServiceError::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        match error {
            // Never leak driver details to clients
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                HttpError::server_error("Server Error. Please try again later")
            }
            other => HttpError::new(other.to_string(), status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(ServiceError::ShiftNotFound(id).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::InvalidShiftStatus(id, ShiftStatus::Cancelled).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::UnauthorizedShiftAccess(id, id).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::UnauthorizedRotaAccess(id, id).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_database_errors_are_masked() {
        let http: HttpError = ServiceError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!http.message.contains("RowNotFound"));
    }

    #[test]
    fn test_lifecycle_errors_become_conflicts() {
        let err: ServiceError = LifecycleError::InvalidTransition {
            from: ShiftStatus::Completed,
            to: ShiftStatus::Open,
        }
        .into();
        let http: HttpError = err.into();
        assert_eq!(http.status, StatusCode::CONFLICT);
        assert_eq!(http.message, "Cannot move shift from completed to open");
    }
}
