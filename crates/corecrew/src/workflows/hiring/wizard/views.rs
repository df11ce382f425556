use std::collections::HashMap;

use crate::workflows::hiring::catalog::PositionCatalog;
use crate::workflows::hiring::questions::QuestionSet;
use crate::workflows::site::views::{escape, layout, message_list};

use super::domain::ApplicationDraft;
use super::machine::{INTERVIEW_PATH, SUBMIT_PATH, VERIFY_PATH};
use super::service::SubmissionReceipt;

/// Start step: position picker plus the contact and attachment form.
pub fn apply_page(catalog: &PositionCatalog, selected: Option<&str>, messages: &[String]) -> String {
    let selected = selected.and_then(|wanted| catalog.resolve(wanted));
    let options: String = catalog
        .positions()
        .iter()
        .map(|position| {
            let marker = if selected.is_some_and(|chosen| chosen.key == position.key) {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{title}\"{marker}>{title}</option>",
                title = escape(position.title)
            )
        })
        .collect();

    let body = format!(
        "<h1>Apply to CoreCrew Logistics</h1>\n{errors}\n\
         <form method=\"post\" action=\"/apply/start\" enctype=\"multipart/form-data\">\n\
         <label>First name <input name=\"firstName\" required maxlength=\"100\"></label>\n\
         <label>Last name <input name=\"lastName\" required maxlength=\"100\"></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required maxlength=\"254\"></label>\n\
         <label>Phone <input type=\"tel\" name=\"phone\"></label>\n\
         <label>Position <select name=\"position\" required>{options}</select></label>\n\
         <label>Cover letter <textarea name=\"coverLetter\" maxlength=\"5000\"></textarea></label>\n\
         <label>Documents (up to 6 files, 15 MB each) \
         <input type=\"file\" name=\"documents\" multiple></label>\n\
         <button type=\"submit\">Continue</button>\n</form>",
        errors = message_list(messages),
    );
    layout("Apply", &body)
}

/// Interview step. `submitted` holds a rejected form's values so they are shown again.
pub fn interview_page(
    draft: &ApplicationDraft,
    questions: &QuestionSet,
    submitted: Option<&HashMap<String, String>>,
    messages: &[String],
) -> String {
    let fields: String = questions
        .questions
        .iter()
        .map(|question| {
            let current = submitted
                .and_then(|answers| answers.get(question.key))
                .or_else(|| {
                    draft
                        .interview_answers
                        .as_ref()
                        .and_then(|answers| answers.get(question.key))
                })
                .map(String::as_str)
                .unwrap_or("");
            format!(
                "<label>{prompt}<textarea name=\"{key}\">{current}</textarea></label>\n",
                prompt = escape(question.prompt),
                key = escape(question.key),
                current = escape(current),
            )
        })
        .collect();

    let body = format!(
        "<h1>Interview: {position}</h1>\n<p>Thanks, {name}. A few questions about your \
         experience.</p>\n{errors}\n<form method=\"post\" action=\"{INTERVIEW_PATH}\">\n{fields}\
         <button type=\"submit\">Continue to verification</button>\n</form>",
        position = escape(&draft.position),
        name = escape(&draft.applicant.first_name),
        errors = message_list(messages),
    );
    layout("Interview", &body)
}

pub fn verify_page(draft: &ApplicationDraft, identity_enabled: bool, messages: &[String]) -> String {
    let provider = if identity_enabled {
        "<p><a href=\"/auth/idme\">Verify with ID.me</a></p>\n<p>Or upload both sides of a \
         government-issued ID instead:</p>"
    } else {
        "<p>Upload both sides of a government-issued ID to verify your identity.</p>"
    };
    let body = format!(
        "<h1>Verify your identity</h1>\n<p>{name}, applying for {position}.</p>\n{errors}\n\
         {provider}\n<form method=\"post\" action=\"{VERIFY_PATH}\" \
         enctype=\"multipart/form-data\">\n\
         <label>ID front <input type=\"file\" name=\"idFront\" accept=\"image/*,.pdf\" required></label>\n\
         <label>ID back <input type=\"file\" name=\"idBack\" accept=\"image/*,.pdf\" required></label>\n\
         <button type=\"submit\">Verify</button>\n</form>",
        name = escape(&draft.applicant.full_name()),
        position = escape(&draft.position),
        errors = message_list(messages),
    );
    layout("Verify", &body)
}

pub fn submit_page(draft: &ApplicationDraft) -> String {
    let answered = draft
        .interview_answers
        .as_ref()
        .map(|answers| answers.values().filter(|answer| !answer.is_empty()).count())
        .unwrap_or(0);
    let body = format!(
        "<h1>Review and submit</h1>\n<dl><dt>Name</dt><dd>{name}</dd><dt>Email</dt>\
         <dd>{email}</dd><dt>Position</dt><dd>{position}</dd><dt>Documents</dt>\
         <dd>{documents}</dd><dt>Interview answers</dt><dd>{answered}</dd>\
         <dt>Verification</dt><dd>{verification}</dd></dl>\n\
         <form method=\"post\" action=\"{SUBMIT_PATH}\"><button type=\"submit\">Submit \
         application</button></form>",
        name = escape(&draft.applicant.full_name()),
        email = escape(&draft.applicant.email),
        position = escape(&draft.position),
        documents = draft.attachments.len(),
        verification = draft.verification.label(),
    );
    layout("Submit", &body)
}

pub fn thank_you_page(first_name: &str, receipt: &SubmissionReceipt) -> String {
    let body = format!(
        "<h1>Thank you, {name}!</h1>\n<p>Your application was received on {date}. Our \
         recruiting team will be in touch.</p>\n<p><a href=\"/jobs\">Browse more jobs</a></p>",
        name = escape(first_name),
        date = receipt.submitted_at.format("%B %-d, %Y"),
    );
    layout("Application received", &body)
}
