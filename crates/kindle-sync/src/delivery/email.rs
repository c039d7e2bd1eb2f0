//! Email sender using SMTP over implicit TLS.

use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::DeliveryError;

/// Trait for delivering a sanitized document.
#[async_trait]
pub trait DocumentSender: Send + Sync {
    /// Send `document` as an HTML attachment named after `title`.
    async fn send(&self, title: &str, document: &[u8]) -> Result<(), DeliveryError>;
}

/// Sends documents to the Kindle address through an authenticated relay.
pub struct KindleMailer {
    config: MailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl KindleMailer {
    /// Create a new mailer with the given configuration.
    pub fn new(config: MailConfig) -> Result<Self, DeliveryError> {
        let creds = Credentials::new(config.from_email.clone(), config.app_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { config, transport })
    }
}

#[async_trait]
impl DocumentSender for KindleMailer {
    async fn send(&self, title: &str, document: &[u8]) -> Result<(), DeliveryError> {
        let email = build_message(&self.config, title, document)?;

        self.transport.send(email).await?;

        tracing::info!(
            to = %self.config.kindle_email,
            title,
            "Email sent successfully"
        );

        Ok(())
    }
}

/// Filesystem-safe attachment name: spaces and slashes become `_`.
pub fn attachment_filename(title: &str) -> String {
    let slug: String = title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();

    if slug.is_empty() {
        "article.html".to_string()
    } else {
        format!("{slug}.html")
    }
}

/// Build the `multipart/mixed` message carrying one base64 HTML attachment.
pub fn build_message(
    config: &MailConfig,
    title: &str,
    document: &[u8],
) -> Result<Message, DeliveryError> {
    let from = parse_mailbox(&config.from_email)?;
    let to = parse_mailbox(&config.kindle_email)?;

    let body = Body::new_with_encoding(document.to_vec(), ContentTransferEncoding::Base64)
        .map_err(|_| DeliveryError::Other("could not base64-encode attachment".to_string()))?;

    let attachment = Attachment::new(attachment_filename(title)).body(body, ContentType::TEXT_HTML);

    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(config.subject.as_str())
        .multipart(MultiPart::mixed().singlepart(attachment))?;

    Ok(email)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|source| DeliveryError::Address {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            from_email: "me@gmail.com".to_string(),
            app_password: "app-pass".to_string(),
            kindle_email: "me@kindle.com".to_string(),
            subject: "Convert".to_string(),
        }
    }

    #[test]
    fn test_filename_replaces_spaces_and_slashes() {
        let name = attachment_filename("Rust / Go: a tale of two runtimes");
        assert_eq!(name, "Rust___Go:_a_tale_of_two_runtimes.html");
        assert!(!name.contains(' '));
        assert!(!name.contains('/'));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn test_filename_for_blank_title() {
        assert_eq!(attachment_filename("   "), "article.html");
    }

    #[test]
    fn test_message_layout() {
        let message = build_message(&mail_config(), "My Great Post", b"<html>hi</html>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: me@gmail.com"));
        assert!(raw.contains("To: me@kindle.com"));
        assert!(raw.contains("Subject: Convert"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("Content-Transfer-Encoding: base64"));
        assert!(raw.contains("attachment; filename=\"My_Great_Post.html\""));
        assert!(raw.contains("PGh0bWw+aGk8L2h0bWw+"));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let mut config = mail_config();
        config.kindle_email = "not-an-address".to_string();

        let err = build_message(&config, "t", b"x").unwrap_err();
        assert!(matches!(err, DeliveryError::Address { .. }));
    }
}
