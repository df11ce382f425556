use std::collections::HashMap;

use serde::Serialize;

use super::domain::{ApplicationDraft, InterviewAnswers};
use crate::workflows::hiring::questions::QuestionSet;

pub const ENTRY_PATH: &str = "/apply";
pub const INTERVIEW_PATH: &str = "/apply/interview";
pub const VERIFY_PATH: &str = "/apply/verify";
pub const SUBMIT_PATH: &str = "/apply/submit";

/// Wizard position derived from what the session currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Entry,
    InterviewPending,
    VerificationPending,
    ReadyToSubmit,
    Done,
}

impl WizardStep {
    /// `Done` is never derived: a finished application leaves no draft behind.
    pub fn of(draft: Option<&ApplicationDraft>) -> Self {
        match draft {
            None => WizardStep::Entry,
            Some(draft) if draft.verification.is_verified() => WizardStep::ReadyToSubmit,
            Some(draft) if draft.interview_answers.is_some() => WizardStep::VerificationPending,
            Some(_) => WizardStep::InterviewPending,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            WizardStep::Entry | WizardStep::Done => ENTRY_PATH,
            WizardStep::InterviewPending => INTERVIEW_PATH,
            WizardStep::VerificationPending => VERIFY_PATH,
            WizardStep::ReadyToSubmit => SUBMIT_PATH,
        }
    }
}

/// Where a request that arrived too early should be sent instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRedirect(pub &'static str);

/// Admit a request for `required` or answer with the redirect the guard demands.
///
/// No draft always goes back to entry, as does an unverified draft asking for submission. A
/// draft that has not answered the interview yet is sent back to the interview.
pub fn guard(
    draft: Option<&ApplicationDraft>,
    required: WizardStep,
) -> Result<&ApplicationDraft, StepRedirect> {
    let Some(draft) = draft else {
        return Err(StepRedirect(WizardStep::Entry.path()));
    };

    let current = WizardStep::of(Some(draft));
    match required {
        WizardStep::VerificationPending if current < WizardStep::VerificationPending => {
            Err(StepRedirect(current.path()))
        }
        WizardStep::ReadyToSubmit if current < WizardStep::ReadyToSubmit => {
            Err(StepRedirect(WizardStep::Entry.path()))
        }
        _ => Ok(draft),
    }
}

pub const PLACEHOLDER_ANSWER: &str = "(no answer provided)";

/// What to do with interview questions the applicant left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerPolicy {
    /// Store blanks as empty strings and move on.
    #[default]
    Lenient,
    /// Store blanks as [`PLACEHOLDER_ANSWER`].
    Placeholder,
    /// Reject the step until every question has a non-blank answer.
    Strict,
}

impl AnswerPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lenient" | "empty" => Some(Self::Lenient),
            "placeholder" => Some(Self::Placeholder),
            "strict" | "required" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Pick one answer per question key out of the submitted form. Unknown form keys are ignored.
pub fn collect_answers(
    questions: &QuestionSet,
    form: &HashMap<String, String>,
    policy: AnswerPolicy,
) -> Result<InterviewAnswers, Vec<String>> {
    let mut answers = InterviewAnswers::new();
    let mut missing = Vec::new();

    for key in questions.keys() {
        let answer = form
            .get(key)
            .map(|value| value.trim().to_string())
            .unwrap_or_default();

        let stored = if !answer.is_empty() {
            answer
        } else {
            match policy {
                AnswerPolicy::Lenient => String::new(),
                AnswerPolicy::Placeholder => PLACEHOLDER_ANSWER.to_string(),
                AnswerPolicy::Strict => {
                    missing.push(key.to_string());
                    continue;
                }
            }
        };
        answers.insert(key.to_string(), stored);
    }

    if missing.is_empty() {
        Ok(answers)
    } else {
        Err(missing)
    }
}
