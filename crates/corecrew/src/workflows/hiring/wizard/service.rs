use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::domain::{ApplicantIdentity, ApplicationDraft, StartApplication, Verification};
use super::machine::{collect_answers, AnswerPolicy};
use super::repository::{
    ApplicationRecord, ConfirmationMailer, KeyValueStore, NotificationDispatcher,
    NotificationEvent, OutboundEmail,
};
use super::session::SessionError;
use super::uploads::{TempUpload, UploadError};
use crate::workflows::hiring::catalog::PositionCatalog;
use crate::workflows::hiring::identity::{
    CallbackParams, IdentityError, IdentityProvider, PendingAuthorization,
};
use crate::workflows::hiring::questions::{QuestionBank, QuestionSet};

/// Outbound collaborators of the wizard.
#[derive(Clone)]
pub struct WizardPorts {
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub store: Arc<dyn KeyValueStore>,
    pub mailer: Arc<dyn ConfirmationMailer>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
}

/// Step transitions of the application wizard and the side effects attached to them.
///
/// Every chat, store and mail call is best-effort: failures are logged and the applicant moves
/// on. Identity-provider calls are the exception since verification depends on them.
pub struct ApplicationWizard {
    catalog: PositionCatalog,
    bank: QuestionBank,
    policy: AnswerPolicy,
    outbound_timeout: Duration,
    ports: WizardPorts,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("application details are invalid")]
    Validation(Vec<String>),
    #[error("both sides of the ID document are required")]
    MissingIdDocuments,
    #[error("interview answers are missing")]
    IncompleteInterview(Vec<String>),
    #[error("application has not been verified")]
    NotVerified,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl WizardError {
    pub fn status(&self) -> StatusCode {
        match self {
            WizardError::Validation(_)
            | WizardError::MissingIdDocuments
            | WizardError::IncompleteInterview(_) => StatusCode::BAD_REQUEST,
            WizardError::NotVerified => StatusCode::SEE_OTHER,
            WizardError::Upload(err) => err.status(),
            WizardError::Identity(err) => match err {
                IdentityError::StateMismatch | IdentityError::MissingCode => {
                    StatusCode::BAD_REQUEST
                }
                IdentityError::NotConfigured => StatusCode::NOT_FOUND,
                IdentityError::Provider(_)
                | IdentityError::Discovery(_)
                | IdentityError::TokenExchange(_)
                | IdentityError::UserInfo(_)
                | IdentityError::Timeout => StatusCode::BAD_GATEWAY,
            },
            WizardError::Session(SessionError::Conflict) => StatusCode::CONFLICT,
            WizardError::Session(SessionError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Messages safe to show the applicant.
    pub fn messages(&self) -> Vec<String> {
        match self {
            WizardError::Validation(messages) => messages.clone(),
            WizardError::IncompleteInterview(keys) => keys
                .iter()
                .map(|key| format!("please answer '{key}'"))
                .collect(),
            WizardError::Identity(_) => {
                vec!["Identity verification failed. Please try again or upload your ID instead."
                    .to_string()]
            }
            WizardError::Session(SessionError::Conflict) => vec![
                "Your application was updated in another window. Please reload and continue there."
                    .to_string(),
            ],
            WizardError::Session(SessionError::Unavailable(_))
            | WizardError::Upload(UploadError::Io(_)) => {
                vec!["Something went wrong. Please try again later.".to_string()]
            }
            other => vec![other.to_string()],
        }
    }
}

/// Result of a successful final submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub record_key: String,
    pub stored: bool,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationWizard {
    pub fn new(ports: WizardPorts, policy: AnswerPolicy, outbound_timeout: Duration) -> Self {
        Self {
            catalog: PositionCatalog::standard(),
            bank: QuestionBank::standard(),
            policy,
            outbound_timeout,
            ports,
        }
    }

    pub fn catalog(&self) -> &PositionCatalog {
        &self.catalog
    }

    pub fn identity_configured(&self) -> bool {
        self.ports.identity.is_some()
    }

    /// Question set for the draft's position, derived fresh on every call.
    pub fn questions_for(&self, draft: &ApplicationDraft) -> QuestionSet {
        self.bank.questions_for_position(&draft.position)
    }

    /// Create a draft, announce it and forward every attachment. The uploads are consumed:
    /// their files are deleted before this returns, whatever the dispatch outcome.
    pub async fn start(
        &self,
        application: StartApplication,
        uploads: Vec<TempUpload>,
    ) -> Result<(ApplicationDraft, QuestionSet), WizardError> {
        application.check().map_err(WizardError::Validation)?;

        let catalog_key = self
            .catalog
            .resolve(&application.position)
            .map(|position| position.key.to_string());

        let draft = ApplicationDraft {
            applicant: ApplicantIdentity {
                first_name: application.first_name,
                last_name: application.last_name,
                email: application.email,
                phone: application.phone,
            },
            position: application.position,
            catalog_key,
            cover_letter: application.cover_letter,
            attachments: uploads.iter().map(TempUpload::meta).collect(),
            interview_answers: None,
            verification: Verification::Unverified,
            started_at: Utc::now(),
        };

        let mut summary = format!("New application started\n{}", draft.summary_line());
        if let Some(letter) = &draft.cover_letter {
            summary.push_str(&format!("\nCover letter: {letter}"));
        }
        summary.push_str(&format!("\nAttachments: {}", uploads.len()));
        self.notify(NotificationEvent::TextSummary(summary)).await;

        for upload in &uploads {
            self.notify(NotificationEvent::FileAttachment {
                path: upload.path().to_path_buf(),
                filename: upload.original_name().to_string(),
                mime_type: upload.mime_type().to_string(),
                caption: Some(format!(
                    "{} - {}",
                    draft.applicant.full_name(),
                    upload.original_name()
                )),
            })
            .await;
        }
        drop(uploads);

        let questions = self.questions_for(&draft);
        info!(
            position = %draft.position,
            catalog_key = ?draft.catalog_key,
            question_set = ?questions.bank_key,
            attachments = draft.attachments.len(),
            "application draft started"
        );
        Ok((draft, questions))
    }

    /// Store one answer per question of the draft's current set.
    pub fn record_answers(
        &self,
        draft: &mut ApplicationDraft,
        form: &HashMap<String, String>,
    ) -> Result<(), WizardError> {
        let questions = self.questions_for(draft);
        let answers =
            collect_answers(&questions, form, self.policy).map_err(WizardError::IncompleteInterview)?;
        info!(
            email = %draft.applicant.email,
            answered = answers.values().filter(|answer| !answer.is_empty()).count(),
            asked = questions.len(),
            "interview answers recorded"
        );
        draft.interview_answers = Some(answers);
        Ok(())
    }

    /// Skip path: verify with uploaded front and back images of an ID document.
    pub async fn verify_with_documents(
        &self,
        draft: &mut ApplicationDraft,
        id_front: Option<TempUpload>,
        id_back: Option<TempUpload>,
    ) -> Result<(), WizardError> {
        let (Some(id_front), Some(id_back)) = (id_front, id_back) else {
            return Err(WizardError::MissingIdDocuments);
        };

        let front = id_front.meta();
        let back = id_back.meta();

        self.notify(answers_artifact(draft)).await;
        self.notify(NotificationEvent::JsonArtifact {
            filename: artifact_name(draft, "identity"),
            payload: json!({
                "applicant": applicant_json(draft),
                "idme_credentials": Value::Null,
                "drivers_license": {
                    "front": { "name": front.original_name, "type": front.mime_type, "size": front.size_bytes },
                    "back": { "name": back.original_name, "type": back.mime_type, "size": back.size_bytes },
                },
            }),
        })
        .await;
        for (side, upload) in [("front", &id_front), ("back", &id_back)] {
            self.notify(NotificationEvent::FileAttachment {
                path: upload.path().to_path_buf(),
                filename: upload.original_name().to_string(),
                mime_type: upload.mime_type().to_string(),
                caption: Some(format!("{} - ID {side}", draft.applicant.full_name())),
            })
            .await;
        }
        drop((id_front, id_back));

        draft.verification = Verification::Skip {
            id_front: front,
            id_back: back,
        };
        self.send_confirmation(draft).await;
        info!(email = %draft.applicant.email, method = "skip", "applicant verified");
        Ok(())
    }

    /// Fresh PKCE material and the provider URL to redirect to.
    pub async fn begin_authorization(
        &self,
    ) -> Result<(PendingAuthorization, String), WizardError> {
        let provider = self
            .ports
            .identity
            .as_ref()
            .ok_or(IdentityError::NotConfigured)?;
        let pending = PendingAuthorization::generate();
        let url = self
            .bounded_identity(provider.authorization_url(&pending))
            .await?;
        Ok((pending, url))
    }

    /// Handle the provider callback. The state is checked before any call leaves the process.
    pub async fn complete_authorization(
        &self,
        draft: &mut ApplicationDraft,
        pending: Option<&PendingAuthorization>,
        params: &CallbackParams,
    ) -> Result<(), WizardError> {
        let provider = self
            .ports
            .identity
            .as_ref()
            .ok_or(IdentityError::NotConfigured)?;

        let pending = match (pending, params.state.as_deref()) {
            (Some(pending), Some(state)) if pending.state_matches(state) => pending,
            _ => {
                warn!(email = %draft.applicant.email, "identity callback state mismatch");
                return Err(IdentityError::StateMismatch.into());
            }
        };

        if let Some(error) = &params.error {
            let detail = params
                .error_description
                .as_deref()
                .map(|description| format!("{error}: {description}"))
                .unwrap_or_else(|| error.clone());
            warn!(email = %draft.applicant.email, %detail, "identity provider returned an error");
            return Err(IdentityError::Provider(detail).into());
        }

        let code = params.code.as_deref().ok_or(IdentityError::MissingCode)?;
        let tokens = self
            .bounded_identity(provider.exchange_code(code, &pending.code_verifier))
            .await?;
        let profile = self.bounded_identity(provider.user_info(&tokens)).await?;

        self.notify(answers_artifact(draft)).await;
        self.notify(NotificationEvent::JsonArtifact {
            filename: artifact_name(draft, "identity"),
            payload: json!({
                "applicant": applicant_json(draft),
                "idme_credentials": profile.claims,
                "drivers_license": Value::Null,
            }),
        })
        .await;

        draft.verification = Verification::IdentityProvider { profile };
        self.send_confirmation(draft).await;
        info!(email = %draft.applicant.email, method = "identity_provider", "applicant verified");
        Ok(())
    }

    /// Persist and announce a verified application. The caller clears the draft afterwards.
    pub async fn submit(&self, draft: &ApplicationDraft) -> Result<SubmissionReceipt, WizardError> {
        if !draft.verification.is_verified() {
            return Err(WizardError::NotVerified);
        }

        let submitted_at = Utc::now();
        let record = ApplicationRecord::from_draft(draft, submitted_at);
        let fields = record.hash_fields();
        let stored = self
            .best_effort("store", self.ports.store.put_hash(&record.key, &fields))
            .await
            .is_some();

        let summary = format!(
            "New Application\n{}\nVerification: {}\nInterview answers: {}",
            draft.summary_line(),
            draft.verification.label(),
            draft
                .interview_answers
                .as_ref()
                .map(|answers| answers.len())
                .unwrap_or(0)
        );
        self.notify(NotificationEvent::TextSummary(summary)).await;

        info!(key = %record.key, stored, "application submitted");
        Ok(SubmissionReceipt {
            record_key: record.key,
            stored,
            submitted_at,
        })
    }

    async fn notify(&self, event: NotificationEvent) {
        notify(self.ports.notifier.as_ref(), self.outbound_timeout, event).await;
    }

    async fn best_effort<T, E, F>(&self, target: &'static str, call: F) -> Option<T>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        best_effort(self.outbound_timeout, target, call).await
    }

    async fn bounded_identity<T, F>(&self, call: F) -> Result<T, IdentityError>
    where
        F: Future<Output = Result<T, IdentityError>>,
    {
        tokio::time::timeout(self.outbound_timeout, call)
            .await
            .map_err(|_| IdentityError::Timeout)?
    }

    async fn send_confirmation(&self, draft: &ApplicationDraft) {
        let email = OutboundEmail {
            to: draft.applicant.email.clone(),
            subject: "We received your CoreCrew Logistics application".to_string(),
            body: format!(
                "Hi {},\n\nThank you for applying for {} with CoreCrew Logistics. Your identity \
                 has been verified. Please return to the application page to submit your \
                 application; our recruiting team will contact you after reviewing it.\n\n\
                 CoreCrew Logistics",
                draft.applicant.first_name, draft.position
            ),
        };
        self.best_effort("mail", self.ports.mailer.send(email)).await;
    }
}

fn applicant_json(draft: &ApplicationDraft) -> Value {
    json!({
        "first_name": draft.applicant.first_name,
        "last_name": draft.applicant.last_name,
        "email": draft.applicant.email,
        "phone": draft.applicant.phone,
        "position": draft.position,
    })
}

fn answers_artifact(draft: &ApplicationDraft) -> NotificationEvent {
    NotificationEvent::JsonArtifact {
        filename: artifact_name(draft, "interview"),
        payload: json!({
            "applicant": applicant_json(draft),
            "interview_answers": draft.interview_answers.clone().unwrap_or_default(),
        }),
    }
}

fn artifact_name(draft: &ApplicationDraft, kind: &str) -> String {
    let email: String = draft
        .applicant
        .email
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    format!("{kind}-{email}.json")
}

/// Send one chat event, logging instead of failing.
pub(crate) async fn notify(
    notifier: &dyn NotificationDispatcher,
    timeout: Duration,
    event: NotificationEvent,
) {
    let kind = event.kind();
    if best_effort(timeout, kind, notifier.send(event)).await.is_some() {
        debug!(kind, "notification delivered");
    }
}

/// Run an outbound call under `timeout`, logging rather than returning failure.
pub(crate) async fn best_effort<T, E, F>(timeout: Duration, target: &'static str, call: F) -> Option<T>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(target_call = target, error = %err, "best-effort call failed");
            None
        }
        Err(_) => {
            warn!(
                target_call = target,
                timeout_ms = timeout.as_millis() as u64,
                "best-effort call timed out"
            );
            None
        }
    }
}
