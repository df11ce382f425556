//! Session-driven application wizard: start, interview, identity verification, submission.
//!
//! The draft lives in the server-side session; each step derives its position from what the
//! draft holds (see [`WizardStep`]) and side effects fan out through the ports in
//! [`repository`].

pub mod domain;
pub mod machine;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod uploads;
pub(crate) mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantIdentity, ApplicationDraft, AttachmentMeta, InterviewAnswers, StartApplication,
    Verification,
};
pub use machine::{guard, AnswerPolicy, StepRedirect, WizardStep};
pub use repository::{
    ApplicationRecord, ConfirmationMailer, KeyValueStore, MailError, NotificationDispatcher,
    NotificationEvent, NotifyError, OutboundEmail, StoreError,
};
pub use router::{application_router, WizardState};
pub use service::{ApplicationWizard, SubmissionReceipt, WizardError, WizardPorts};
pub use session::{
    CookiePolicy, LoadedSession, MemorySessionStore, SessionData, SessionError, SessionId,
    SessionStore,
};
pub use uploads::{TempUpload, UploadError, UploadLimits, UploadedForm};
