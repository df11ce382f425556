use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::workflows::hiring::identity::IdentityProfile;

/// Contact details entered on the start step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl ApplicantIdentity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Raw start-step form fields, validated before a draft is created.
#[derive(Debug, Clone, Default, Validate)]
pub struct StartApplication {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    #[validate(
        email(message = "email address is not valid"),
        length(max = 254, message = "email address is too long")
    )]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 120, message = "choose a position"))]
    pub position: String,
    #[validate(length(max = 5000, message = "cover letter is too long"))]
    pub cover_letter: Option<String>,
}

impl StartApplication {
    /// Build from loosely-typed form fields, trimming values and dropping blank optionals.
    pub fn from_fields(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let required = |name: &str| lookup(name).map(|v| v.trim().to_string()).unwrap_or_default();
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            first_name: required("firstName"),
            last_name: required("lastName"),
            email: required("email"),
            phone: optional("phone"),
            position: required("position"),
            cover_letter: optional("coverLetter"),
        }
    }

    /// Validate and flatten errors into human-readable messages.
    pub fn check(&self) -> Result<(), Vec<String>> {
        self.validate().map_err(|errors| flatten_errors(&errors))
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '(' | ')' | '.' | ' '));
    if allowed && (7..=20).contains(&digits) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone");
        error.message = Some("phone number is not valid".into());
        Err(error)
    }
}

fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, list)| {
            list.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{field} is not valid"))
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages
}

/// Metadata for a file received from the applicant. The bytes themselves are deleted once
/// every notification referencing them has been attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub storage_path: PathBuf,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

pub type InterviewAnswers = BTreeMap<String, String>;

/// How the applicant proved their identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Verification {
    #[default]
    Unverified,
    IdentityProvider {
        profile: IdentityProfile,
    },
    Skip {
        id_front: AttachmentMeta,
        id_back: AttachmentMeta,
    },
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        !matches!(self, Verification::Unverified)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verification::Unverified => "unverified",
            Verification::IdentityProvider { .. } => "identity_provider",
            Verification::Skip { .. } => "skip",
        }
    }
}

/// In-progress application owned by one browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub applicant: ApplicantIdentity,
    /// Position as submitted; free text when it matches nothing in the catalog.
    pub position: String,
    pub catalog_key: Option<String>,
    pub cover_letter: Option<String>,
    pub attachments: Vec<AttachmentMeta>,
    pub interview_answers: Option<InterviewAnswers>,
    pub verification: Verification,
    pub started_at: DateTime<Utc>,
}

impl ApplicationDraft {
    pub fn summary_line(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nPhone: {}\nPosition: {}",
            self.applicant.full_name(),
            self.applicant.email,
            self.applicant.phone.as_deref().unwrap_or("-"),
            self.position
        )
    }
}
