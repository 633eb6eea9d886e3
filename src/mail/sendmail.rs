use ammonia::{Builder, UrlRelative};
use regex::Regex;
use serde_json::json;
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::dtos::emaildtos::SendEmailRequest;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;
const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Error, Debug, PartialEq)]
pub enum EmailError {
    #[error("Invalid email address: {0}")]
    InvalidRecipient(String),

    #[error("Email subject cannot be empty")]
    EmptySubject,

    #[error("Failed after {retries} retries: {last_error}")]
    DeliveryFailed { retries: u32, last_error: String },
}

/// How a message left the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the provider; carries the provider's message id.
    Dispatched(String),
    /// No provider configured; the message was only logged.
    Logged,
}

pub fn validate_email(email: &str) -> Result<(), EmailError> {
    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .map_err(|_| EmailError::InvalidRecipient(email.to_string()))?;

    if email_regex.is_match(email) {
        Ok(())
    } else {
        Err(EmailError::InvalidRecipient(email.to_string()))
    }
}

// HTML sanitizer for email content
pub fn sanitize_html(input: &str) -> String {
    let mut builder = Builder::default();

    builder
        .add_tags(&["p", "br", "strong", "em", "u", "span", "div", "a", "h1", "h2", "h3", "h4", "table", "tr", "td"])
        .add_generic_attributes(&["style", "class"])
        .add_tag_attributes("a", &["href", "target"])
        .url_relative(UrlRelative::PassThrough)
        .link_rel(None);

    builder.clean(input).to_string()
}

#[derive(Debug, Clone)]
pub struct EmailDispatcher {
    api_key: Option<String>,
    from_email: String,
    client: reqwest::Client,
}

impl EmailDispatcher {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn send(&self, request: &SendEmailRequest) -> Result<Delivery, EmailError> {
        validate_email(&request.to)?;
        if request.subject.trim().is_empty() {
            return Err(EmailError::EmptySubject);
        }

        let html = sanitize_html(&request.html);

        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(
                to = %request.to,
                subject = %request.subject,
                html_len = html.len(),
                "No email provider configured, message logged only"
            );
            return Ok(Delivery::Logged);
        };

        self.send_with_retries(api_key, request, &html).await
    }

    async fn send_with_retries(
        &self,
        api_key: &str,
        request: &SendEmailRequest,
        html: &str,
    ) -> Result<Delivery, EmailError> {
        let mut last_error = String::from("Unknown email sending error");

        for attempt in 1..=MAX_RETRIES {
            match self.send_via_resend(api_key, request, html).await {
                Ok(email_id) => {
                    tracing::info!("✓ Email sent successfully to {} (id: {})", request.to, email_id);
                    return Ok(Delivery::Dispatched(email_id));
                }
                Err(e) => {
                    last_error = e;
                    if attempt < MAX_RETRIES {
                        let delay = RETRY_DELAY_MS * (2_u64.pow(attempt - 1)); // Exponential backoff
                        tracing::warn!(
                            "Email send attempt {} failed for {}. Retrying in {}ms...",
                            attempt,
                            request.to,
                            delay
                        );
                        sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        tracing::error!("✗ Email failed for {}: {}", request.to, last_error);
        Err(EmailError::DeliveryFailed {
            retries: MAX_RETRIES,
            last_error,
        })
    }

    async fn send_via_resend(
        &self,
        api_key: &str,
        request: &SendEmailRequest,
        html: &str,
    ) -> Result<String, String> {
        let mut body = json!({
            "from": self.from_email,
            "to": request.to,
            "subject": request.subject,
            "html": html,
        });
        if let Some(text) = &request.text {
            body["text"] = json!(text);
        }

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "No response body".to_string());

        if status.is_success() {
            let id = serde_json::from_str::<serde_json::Value>(&response_text)
                .ok()
                .and_then(|body| body.get("id").and_then(|v| v.as_str()).map(str::to_string))
                .unwrap_or_else(|| "success".to_string());
            Ok(id)
        } else {
            Err(format!("Resend API error ({}): {}", status.as_u16(), response_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(to: &str) -> SendEmailRequest {
        SendEmailRequest {
            to: to.to_string(),
            subject: "Your shift is confirmed".to_string(),
            html: "<p>See you tomorrow</p><script>alert('x')</script>".to_string(),
            text: None,
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("worker@example.com").is_ok());
        assert!(validate_email("first.last+shifts@agency.co.uk").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_html_sanitization() {
        let sanitized = sanitize_html("<script>alert('xss')</script><p>Safe content</p>");
        assert!(!sanitized.contains("<script>"));
        assert!(sanitized.contains("<p>Safe content</p>"));
    }

    #[tokio::test]
    async fn test_without_provider_messages_are_logged() {
        let dispatcher = EmailDispatcher::new(None, "FlexiWork <noreply@flexiwork.app>".to_string());
        assert!(!dispatcher.is_live());
        assert_eq!(dispatcher.send(&request("worker@example.com")).await, Ok(Delivery::Logged));
    }

    #[tokio::test]
    async fn test_rejects_bad_recipient_before_dispatch() {
        let dispatcher = EmailDispatcher::new(None, "noreply@flexiwork.app".to_string());
        assert_eq!(
            dispatcher.send(&request("nobody")).await,
            Err(EmailError::InvalidRecipient("nobody".to_string()))
        );
    }
}
