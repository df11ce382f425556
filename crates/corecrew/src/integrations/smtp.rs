use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::IntegrationError;
use crate::config::SmtpConfig;
use crate::workflows::hiring::wizard::{ConfirmationMailer, MailError, OutboundEmail};

/// Plain-text confirmation mail over SMTP, with STARTTLS unless disabled.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self, IntegrationError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| IntegrationError::Sender(config.from.clone()))?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|err| {
                IntegrationError::Smtp {
                    host: config.host.clone(),
                    reason: err.to_string(),
                }
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let builder = builder.port(config.port).timeout(Some(timeout));
        let builder = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => builder,
        };

        info!(
            host = %config.host,
            port = config.port,
            starttls = config.starttls,
            "smtp mailer initialized"
        );
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

/// Build the RFC 5322 message for an outbound confirmation.
pub fn build_message(from: &Mailbox, email: &OutboundEmail) -> Result<Message, MailError> {
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|_| MailError::Address(email.to.clone()))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|err| MailError::Build(err.to_string()))
}

#[async_trait]
impl ConfirmationMailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, &email)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;
        info!(to = %email.to, "confirmation email sent");
        Ok(())
    }

    async fn probe(&self) -> Result<bool, MailError> {
        self.transport
            .test_connection()
            .await
            .map_err(|err| MailError::Transport(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            to: to.to_string(),
            subject: "We received your application".to_string(),
            body: "Hi Ana".to_string(),
        }
    }

    #[test]
    fn message_carries_headers_and_body() {
        let from: Mailbox = "CoreCrew <careers@corecrew.test>".parse().expect("mailbox");
        let message = build_message(&from, &email("ana@example.com")).expect("message");
        let formatted = String::from_utf8(message.formatted()).expect("utf8");
        assert!(formatted.contains("To: ana@example.com"));
        assert!(formatted.contains("Subject: We received your application"));
        assert!(formatted.contains("Hi Ana"));
    }

    #[test]
    fn invalid_recipient_is_rejected_before_sending() {
        let from: Mailbox = "careers@corecrew.test".parse().expect("mailbox");
        let error = build_message(&from, &email("not an address")).expect_err("invalid");
        assert!(matches!(error, MailError::Address(_)));
    }

    #[test]
    fn invalid_sender_fails_setup() {
        let config = SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            username: None,
            password: None,
            from: "nobody".to_string(),
            starttls: false,
        };
        assert!(matches!(
            SmtpMailer::new(&config, Duration::from_secs(1)),
            Err(IntegrationError::Sender(_))
        ));
    }
}
