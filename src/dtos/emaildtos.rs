use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of the `send-email` function.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendEmailRequest {
    #[validate(email(message = "Recipient must be a valid email address"))]
    pub to: String,

    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, message = "HTML body is required"))]
    pub html: String,

    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SendEmailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SendEmailResponse {
    pub fn sent(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}
