// routes.rs
use std::{sync::Arc, time::Duration};

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handler::{
        admin::admin_handler,
        disputes::disputes_handler,
        earnings::earnings_handler,
        email::email_handler,
        payments::payments_handler,
        reviews::reviews_handler,
        rota::rota_handler,
        shifts::shifts_handler,
        timesheets::timesheets_handler,
    },
    middleware::auth,
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(app_state.env.request_timeout_secs);

    let api_route = Router::new()
        .merge(shifts_handler())
        .merge(timesheets_handler())
        .merge(payments_handler())
        .merge(disputes_handler())
        .merge(reviews_handler())
        .merge(rota_handler())
        .merge(earnings_handler())
        .nest("/admin", admin_handler())
        .layer(middleware::from_fn(auth))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    let functions_route = email_handler()
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.email_dispatcher.clone()));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .nest("/functions/v1", functions_route)
        .layer(TimeoutLayer::new(request_timeout))
}
