pub mod background_jobs;
pub mod dispute_service;
pub mod earnings_service;
pub mod error;
pub mod lifecycle;
pub mod notification_service;
pub mod payment_calculator;
pub mod payment_service;
pub mod reconcile_service;
pub mod review_service;
pub mod rota_service;
pub mod shift_service;
