use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;

use crate::{
    error::{AppError, Result},
    models::OutgoingEmail,
};

pub const VERIFICATION_SUBJECT: &str = "Verify your account";

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Builds the verification message for `link`, the frontend URL carrying the code.
///
/// Both values are escaped for their position in the markup. The name goes in
/// last so braces typed by the user are never read as placeholders.
pub fn verification_email(recipient: &str, first_name: &str, link: &str) -> OutgoingEmail {
    let html_template = include_str!("../utils/verify_email.html");
    let html = html_template
        .replace(
            "{{verification_href}}",
            &html_escape::encode_double_quoted_attribute(link),
        )
        .replace("{{verification_link}}", &html_escape::encode_text(link))
        .replace("{{first_name}}", &html_escape::encode_text(first_name));

    OutgoingEmail {
        to: recipient.to_string(),
        subject: VERIFICATION_SUBJECT.to_string(),
        html,
    }
}

pub struct SesMailer {
    client: SesClient,
    sender: String,
}

impl SesMailer {
    pub fn new(client: SesClient, sender: String) -> Self {
        Self { client, sender }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let destination = aws_sdk_sesv2::types::Destination::builder()
            .to_addresses(&email.to)
            .build();

        let subject = aws_sdk_sesv2::types::Content::builder()
            .data(&email.subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| AppError::DeliveryError(format!("Failed to build subject: {}", e)))?;

        let html_body = aws_sdk_sesv2::types::Content::builder()
            .data(&email.html)
            .charset("UTF-8")
            .build()
            .map_err(|e| AppError::DeliveryError(format!("Failed to build HTML body: {}", e)))?;

        let body = aws_sdk_sesv2::types::Body::builder()
            .html(html_body)
            .build();

        let message = aws_sdk_sesv2::types::Message::builder()
            .subject(subject)
            .body(body)
            .build();

        let content = aws_sdk_sesv2::types::EmailContent::builder()
            .simple(message)
            .build();

        self.client
            .send_email()
            .from_email_address(&self.sender)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send email: {:?}", e);
                AppError::DeliveryError(format!("SES rejected message to {}", email.to))
            })?;

        tracing::info!("Email '{}' sent to {}", email.subject, email.to);

        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Mail transport is 'log', not delivering:\n{}",
            email.html
        );
        Ok(())
    }
}
