use super::sendmail::{Delivery, EmailDispatcher, EmailError};
use crate::dtos::emaildtos::SendEmailRequest;

const APPLICATION_DECISION_TEMPLATE: &str = include_str!("templates/application-decision.html");
const TIMESHEET_CONFIRMED_TEMPLATE: &str = include_str!("templates/timesheet-confirmed.html");
const PAYMENT_RELEASED_TEMPLATE: &str = include_str!("templates/payment-released.html");
const DISPUTE_OPENED_TEMPLATE: &str = include_str!("templates/dispute-opened.html");

/// Fills `{{key}}` placeholders; values are HTML-escaped.
pub fn render_template(template: &str, placeholders: &[(&str, String)]) -> String {
    let mut html = template.to_string();
    for (key, value) in placeholders {
        html = html.replace(&format!("{{{{{}}}}}", key), &ammonia::clean_text(value));
    }
    html
}

async fn send_rendered(
    dispatcher: &EmailDispatcher,
    to_email: &str,
    subject: &str,
    template: &str,
    placeholders: &[(&str, String)],
) -> Result<Delivery, EmailError> {
    let request = SendEmailRequest {
        to: to_email.to_string(),
        subject: subject.to_string(),
        html: render_template(template, placeholders),
        text: None,
    };

    dispatcher.send(&request).await
}

pub async fn send_application_decision_email(
    dispatcher: &EmailDispatcher,
    to_email: &str,
    name: &str,
    shift_title: &str,
    shift_date: &str,
    decision: &str,
) -> Result<Delivery, EmailError> {
    let subject = format!("Application {} - {}", decision, shift_title);
    let placeholders = [
        ("name", name.to_string()),
        ("shift_title", shift_title.to_string()),
        ("shift_date", shift_date.to_string()),
        ("decision", decision.to_string()),
    ];

    send_rendered(dispatcher, to_email, &subject, APPLICATION_DECISION_TEMPLATE, &placeholders).await
}

pub async fn send_timesheet_confirmed_email(
    dispatcher: &EmailDispatcher,
    to_email: &str,
    name: &str,
    shift_title: &str,
    shift_date: &str,
    worker_payout: &str,
) -> Result<Delivery, EmailError> {
    let placeholders = [
        ("name", name.to_string()),
        ("shift_title", shift_title.to_string()),
        ("shift_date", shift_date.to_string()),
        ("worker_payout", worker_payout.to_string()),
    ];

    send_rendered(dispatcher, to_email, "Timesheet confirmed", TIMESHEET_CONFIRMED_TEMPLATE, &placeholders).await
}

pub async fn send_payment_released_email(
    dispatcher: &EmailDispatcher,
    to_email: &str,
    name: &str,
    shift_title: &str,
    worker_payout: &str,
) -> Result<Delivery, EmailError> {
    let placeholders = [
        ("name", name.to_string()),
        ("shift_title", shift_title.to_string()),
        ("worker_payout", worker_payout.to_string()),
    ];

    send_rendered(dispatcher, to_email, "Payment released", PAYMENT_RELEASED_TEMPLATE, &placeholders).await
}

pub async fn send_dispute_opened_email(
    dispatcher: &EmailDispatcher,
    to_email: &str,
    name: &str,
    shift_title: &str,
    dispute_type: &str,
    reason: &str,
) -> Result<Delivery, EmailError> {
    let placeholders = [
        ("name", name.to_string()),
        ("shift_title", shift_title.to_string()),
        ("dispute_type", dispute_type.to_string()),
        ("reason", reason.to_string()),
    ];

    send_rendered(dispatcher, to_email, "Timesheet disputed", DISPUTE_OPENED_TEMPLATE, &placeholders).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_and_escapes_placeholders() {
        let html = render_template(
            TIMESHEET_CONFIRMED_TEMPLATE,
            &[
                ("name", "Sam <b>".to_string()),
                ("shift_title", "Bar staff".to_string()),
                ("shift_date", "2026-03-02".to_string()),
                ("worker_payout", "220.00".to_string()),
            ],
        );

        // clean_text encodes spaces too
        assert!(html.contains(&ammonia::clean_text("Bar staff")));
        assert!(html.contains("Sam&#32;&lt;b&gt;"));
        assert!(html.contains("220.00"));
        assert!(!html.contains("{{"));
        assert!(!html.contains("Sam <b>"));
    }

    #[tokio::test]
    async fn test_lifecycle_email_goes_through_dispatcher() {
        let dispatcher = EmailDispatcher::new(None, "noreply@flexiwork.app".to_string());
        let delivery = send_payment_released_email(
            &dispatcher,
            "worker@example.com",
            "Sam",
            "Bar staff",
            "220.00",
        )
        .await;
        assert_eq!(delivery, Ok(Delivery::Logged));
    }
}
