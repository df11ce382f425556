use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use super::domain::{ApplicationDraft, Verification};

/// One outbound chat message. Built on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    TextSummary(String),
    JsonArtifact {
        filename: String,
        payload: serde_json::Value,
    },
    FileAttachment {
        path: PathBuf,
        filename: String,
        mime_type: String,
        caption: Option<String>,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::TextSummary(_) => "text",
            NotificationEvent::JsonArtifact { .. } => "json",
            NotificationEvent::FileAttachment { .. } => "file",
        }
    }
}

/// Chat API the hiring team watches for new applications.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, event: NotificationEvent) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("chat transport unavailable: {0}")]
    Transport(String),
    #[error("chat API rejected the message: {0}")]
    Rejected(String),
    #[error("attachment could not be read: {0}")]
    Attachment(#[from] std::io::Error),
}

/// Hash/set operations of the external key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn put_hash(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError>;
    async fn add_to_set(&self, key: &str, member: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),
    #[error("key-value store rejected the command: {0}")]
    Rejected(String),
}

/// Transactional mail relay.
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;

    /// Check that the relay accepts connections. Disabled mailers report `false`.
    async fn probe(&self) -> Result<bool, MailError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address '{0}'")]
    Address(String),
    #[error("message could not be built: {0}")]
    Build(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Final application snapshot written to the audit store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRecord {
    pub key: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub cover_letter: String,
    pub interview_answers: serde_json::Value,
    pub files: serde_json::Value,
    pub verification: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn from_draft(draft: &ApplicationDraft, submitted_at: DateTime<Utc>) -> Self {
        let files = draft
            .attachments
            .iter()
            .map(|file| json!({ "name": file.original_name, "type": file.mime_type }))
            .collect::<Vec<_>>();

        let verification = match &draft.verification {
            Verification::Unverified => json!({ "method": "unverified" }),
            Verification::IdentityProvider { profile } => json!({
                "method": "identity_provider",
                "profile": profile.claims,
            }),
            Verification::Skip { id_front, id_back } => json!({
                "method": "skip",
                "id_front": id_front.original_name,
                "id_back": id_back.original_name,
            }),
        };

        Self {
            key: record_key("application", submitted_at, &draft.applicant.email),
            first_name: draft.applicant.first_name.clone(),
            last_name: draft.applicant.last_name.clone(),
            email: draft.applicant.email.clone(),
            phone: draft.applicant.phone.clone().unwrap_or_default(),
            position: draft.position.clone(),
            cover_letter: draft.cover_letter.clone().unwrap_or_default(),
            interview_answers: json!(draft.interview_answers.clone().unwrap_or_default()),
            files: serde_json::Value::Array(files),
            verification,
            created_at: submitted_at,
        }
    }

    /// Flat string fields in the store's hash layout; JSON columns are stringified.
    pub fn hash_fields(&self) -> Vec<(String, String)> {
        vec![
            ("firstName".to_string(), self.first_name.clone()),
            ("lastName".to_string(), self.last_name.clone()),
            ("email".to_string(), self.email.clone()),
            ("phone".to_string(), self.phone.clone()),
            ("position".to_string(), self.position.clone()),
            ("coverLetter".to_string(), self.cover_letter.clone()),
            (
                "interviewAnswers".to_string(),
                self.interview_answers.to_string(),
            ),
            ("files".to_string(), self.files.to_string()),
            ("verification".to_string(), self.verification.to_string()),
            (
                "createdAt".to_string(),
                self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]
    }
}

/// `{prefix}:{unix millis}:{email with every non-alphanumeric replaced by '_'}`.
///
/// Two submissions from the same sanitized email within one millisecond collide; the store
/// is an audit trail, not the system of record.
pub fn record_key(prefix: &str, at: DateTime<Utc>, email: &str) -> String {
    let sanitized: String = email
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    format!("{prefix}:{}:{sanitized}", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_key_sanitizes_email() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("valid");
        assert_eq!(
            record_key("application", at, "ana.lee+jobs@example.com"),
            "application:1700000000123:ana_lee_jobs_example_com"
        );
    }
}
