// handler/email.rs
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::emaildtos::{SendEmailRequest, SendEmailResponse},
    mail::sendmail::{Delivery, EmailDispatcher, EmailError},
};

/// `POST /send-email`. Public; callers are other backend functions and
/// the mobile client, neither of which holds a session here.
pub fn email_handler() -> Router {
    Router::new().route("/send-email", post(send_email))
}

pub async fn send_email(
    Extension(dispatcher): Extension<Arc<EmailDispatcher>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SendEmailResponse::failed(rejection.body_text())),
            );
        }
    };

    if let Err(e) = body.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(SendEmailResponse::failed(e.to_string())),
        );
    }

    match dispatcher.send(&body).await {
        Ok(Delivery::Dispatched(id)) => {
            tracing::info!("send-email dispatched to {} (id: {})", body.to, id);
            (
                StatusCode::OK,
                Json(SendEmailResponse::sent(format!("Email sent to {}", body.to))),
            )
        }
        Ok(Delivery::Logged) => (
            StatusCode::OK,
            Json(SendEmailResponse::sent(format!("Email logged for {}", body.to))),
        ),
        Err(e @ (EmailError::InvalidRecipient(_) | EmailError::EmptySubject)) => (
            StatusCode::BAD_REQUEST,
            Json(SendEmailResponse::failed(e.to_string())),
        ),
        Err(e) => {
            tracing::error!("send-email failed for {}: {}", body.to, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SendEmailResponse::failed(e.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let dispatcher = EmailDispatcher::new(None, "FlexiWork <noreply@flexiwork.app>".to_string());
        email_handler().layer(Extension(Arc::new(dispatcher)))
    }

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/send-email")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_request_succeeds_without_provider() {
        let (status, body) = post_json(
            r#"{"to":"worker@example.com","subject":"Shift confirmed","html":"<p>See you at 9</p>"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["message"].as_str().unwrap().contains("worker@example.com"));
        assert!(body.get("error").is_none());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_optional_text_is_accepted() {
        let (status, body) = post_json(
            r#"{"to":"worker@example.com","subject":"Hi","html":"<p>Hi</p>","text":"Hi"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_invalid_address_is_rejected() {
        let (status, body) =
            post_json(r#"{"to":"not-an-address","subject":"Hi","html":"<p>Hi</p>"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected_in_contract_shape() {
        let (status, body) = post_json(r#"{"to":"worker@example.com"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["timestamp"].is_string());
    }
}
