use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::workflows::hiring::wizard::repository::record_key;
use crate::workflows::hiring::wizard::service::{best_effort, notify};
use crate::workflows::hiring::wizard::{
    KeyValueStore, NotificationDispatcher, NotificationEvent, TempUpload,
};

pub const NEWSLETTER_SET: &str = "newsletter:subscribers";

/// Contact form, newsletter sign-up and quick apply. Every side effect is best-effort: the
/// visitor always gets the same response whether or not delivery succeeded.
pub struct OutreachDesk {
    notifier: Arc<dyn NotificationDispatcher>,
    store: Arc<dyn KeyValueStore>,
    outbound_timeout: Duration,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterSignup {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct QuickApplication {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email address is not valid"))]
    pub email: String,
    #[validate(length(max = 5000, message = "message is too long"))]
    pub message: String,
}

impl QuickApplication {
    pub fn check(&self) -> Result<(), Vec<String>> {
        self.validate().map_err(|errors| messages(&errors))
    }
}

fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut list: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .filter_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .collect();
    list.sort();
    list
}

impl OutreachDesk {
    pub fn new(
        notifier: Arc<dyn NotificationDispatcher>,
        store: Arc<dyn KeyValueStore>,
        outbound_timeout: Duration,
    ) -> Self {
        Self {
            notifier,
            store,
            outbound_timeout,
        }
    }

    /// Store the message under `contact:{millis}:{email}` and forward it to the chat.
    pub async fn contact(&self, message: ContactMessage) {
        let now = Utc::now();
        let key = record_key("contact", now, message.email.trim());
        let fields = vec![
            ("name".to_string(), message.name.trim().to_string()),
            ("email".to_string(), message.email.trim().to_string()),
            ("subject".to_string(), message.subject.trim().to_string()),
            ("message".to_string(), message.message.trim().to_string()),
            (
                "createdAt".to_string(),
                now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ];
        best_effort(
            self.outbound_timeout,
            "store",
            self.store.put_hash(&key, &fields),
        )
        .await;

        let text = format!(
            "New contact message\nFrom: {} <{}>\nSubject: {}\nMessage: {}",
            message.name.trim(),
            message.email.trim(),
            message.subject.trim(),
            message.message.trim()
        );
        notify(
            self.notifier.as_ref(),
            self.outbound_timeout,
            NotificationEvent::TextSummary(text),
        )
        .await;
        info!(%key, "contact message received");
    }

    /// Add a subscriber; blank addresses are announced but not stored.
    pub async fn subscribe(&self, signup: NewsletterSignup) {
        let email = signup.email.trim();
        if !email.is_empty() {
            best_effort(
                self.outbound_timeout,
                "store",
                self.store.add_to_set(NEWSLETTER_SET, email),
            )
            .await;
        }
        notify(
            self.notifier.as_ref(),
            self.outbound_timeout,
            NotificationEvent::TextSummary(format!("New newsletter subscriber: {email}")),
        )
        .await;
    }

    /// Forward a quick application and its resume. The resume file is deleted on return.
    pub async fn quick_apply(
        &self,
        application: QuickApplication,
        resume: Option<TempUpload>,
    ) -> Result<(), Vec<String>> {
        application.check()?;

        let message = match application.message.trim() {
            "" => "(none)",
            text => text,
        };
        let text = format!(
            "New Quick Apply Submission:\nName: {}\nEmail: {}\nMessage: {message}",
            application.name, application.email
        );
        notify(
            self.notifier.as_ref(),
            self.outbound_timeout,
            NotificationEvent::TextSummary(text),
        )
        .await;

        if let Some(resume) = resume {
            notify(
                self.notifier.as_ref(),
                self.outbound_timeout,
                NotificationEvent::FileAttachment {
                    path: resume.path().to_path_buf(),
                    filename: resume.original_name().to_string(),
                    mime_type: resume.mime_type().to_string(),
                    caption: Some(format!("{}'s Resume", application.name)),
                },
            )
            .await;
        }
        info!(email = %application.email, "quick application received");
        Ok(())
    }
}
