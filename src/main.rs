mod models;
mod service;
mod config;
mod dtos;
mod error;
mod db;
mod utils;
mod middleware;
mod mail;
mod handler;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use crate::db::db::DBClient;
use dotenv::dotenv;
use mail::sendmail::EmailDispatcher;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use service::{
    dispute_service::DisputeService,
    earnings_service::EarningsService,
    notification_service::NotificationService,
    payment_service::PaymentService,
    reconcile_service::ReconcileService,
    review_service::ReviewService,
    rota_service::RotaService,
    shift_service::ShiftService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub email_dispatcher: Arc<EmailDispatcher>,
    pub shift_service: Arc<ShiftService>,
    pub payment_service: Arc<PaymentService>,
    pub dispute_service: Arc<DisputeService>,
    pub review_service: Arc<ReviewService>,
    pub rota_service: Arc<RotaService>,
    pub earnings_service: Arc<EarningsService>,
    pub reconcile_service: Arc<ReconcileService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let email_dispatcher = Arc::new(EmailDispatcher::new(
            config.resend_api_key.clone(),
            config.from_email.clone(),
        ));
        let notification_service = Arc::new(NotificationService::new(
            db_client_arc.clone(),
            email_dispatcher.clone(),
        ));

        let shift_service = Arc::new(ShiftService::new(
            db_client_arc.clone(),
            notification_service.clone(),
            config.platform_fee_percentage.clone(),
            config.payout_model,
        ));

        let payment_service = Arc::new(PaymentService::new(
            db_client_arc.clone(),
            shift_service.clone(),
            notification_service.clone(),
            config.payout_model,
        ));

        let dispute_service = Arc::new(DisputeService::new(
            db_client_arc.clone(),
            notification_service.clone(),
        ));

        let review_service = Arc::new(ReviewService::new(db_client_arc.clone()));
        let rota_service = Arc::new(RotaService::new(db_client_arc.clone(), shift_service.clone()));
        let earnings_service = Arc::new(EarningsService::new(db_client_arc.clone()));
        let reconcile_service = Arc::new(ReconcileService::new(db_client_arc.clone()));

        Self {
            env: config,
            db_client: db_client_arc,
            email_dispatcher,
            shift_service,
            payment_service,
            dispute_service,
            review_service,
            rota_service,
            earnings_service,
            reconcile_service,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::init()?;

    let pool = match PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅ Connection to the database is successful!");
            tracing::info!("   - Max connections: {}", config.database_max_connections);
            pool
        }
        Err(err) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    if app_state.email_dispatcher.is_live() {
        tracing::info!("📧 Email delivery via Resend is enabled");
    } else {
        tracing::info!("ℹ️  RESEND_API_KEY not set - emails are logged only");
    }
    tracing::info!(
        "💷 Platform fee {} with {} payouts",
        config.platform_fee_percentage,
        config.payout_model
    );

    let app = create_router(app_state.clone()).layer(cors);

    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_reconcile_job(app_state_clone).await;
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
