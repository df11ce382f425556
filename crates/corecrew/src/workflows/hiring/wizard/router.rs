use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::FormRejection, DefaultBodyLimit, Multipart,
        Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::warn;

use super::domain::StartApplication;
use super::machine::{guard, StepRedirect, WizardStep, ENTRY_PATH, SUBMIT_PATH, VERIFY_PATH};
use super::service::{ApplicationWizard, WizardError};
use super::session::{CookiePolicy, LoadedSession, SessionStore};
use super::uploads::{UploadLimits, UploadedForm};
use super::views;
use crate::workflows::hiring::identity::CallbackParams;
use crate::workflows::site::views::error_page;

/// Shared state behind every wizard route.
pub struct WizardState {
    pub wizard: Arc<ApplicationWizard>,
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: CookiePolicy,
    pub upload_dir: PathBuf,
    pub limits: UploadLimits,
}

/// Router for the application wizard and the identity-provider redirect pair.
pub fn application_router(state: Arc<WizardState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.limits.body_limit());

    Router::new()
        .route("/apply", get(entry_handler))
        .route("/apply/start", post(start_handler).layer(body_limit))
        .route(
            "/apply/interview",
            get(interview_page_handler).post(interview_handler),
        )
        .route(
            "/apply/verify",
            get(verify_page_handler)
                .post(verify_handler)
                .layer(body_limit),
        )
        .route("/apply/skip-idme", post(verify_handler).layer(body_limit))
        .route("/apply/submit", get(submit_page_handler).post(submit_handler))
        .route("/auth/idme", get(authorize_handler))
        .route("/auth/idme/callback", get(callback_handler))
        .with_state(state)
}

impl IntoResponse for WizardError {
    fn into_response(self) -> Response {
        if matches!(self, WizardError::NotVerified) {
            return Redirect::to(ENTRY_PATH).into_response();
        }
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, %status, "wizard request failed");
        }
        error_page(status, &self.messages())
    }
}

impl IntoResponse for StepRedirect {
    fn into_response(self) -> Response {
        Redirect::to(self.0).into_response()
    }
}

fn with_cookie(cookie: Option<HeaderValue>, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EntryQuery {
    position: Option<String>,
}

pub(crate) async fn entry_handler(
    State(state): State<Arc<WizardState>>,
    Query(query): Query<EntryQuery>,
) -> Html<String> {
    Html(views::apply_page(
        state.wizard.catalog(),
        query.position.as_deref(),
        &[],
    ))
}

pub(crate) async fn start_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, WizardError> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            let messages = vec![format!("application form could not be read: {rejection}")];
            let body = views::apply_page(state.wizard.catalog(), None, &messages);
            return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
        }
    };
    let mut session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let mut form = UploadedForm::read(multipart, &state.upload_dir, state.limits).await?;

    let uploads = form.take_files("documents");
    let application = StartApplication::from_fields(|name| form.text(name));
    let submitted_position = application.position.clone();

    let (draft, questions) = match state.wizard.start(application, uploads).await {
        Ok(started) => started,
        Err(WizardError::Validation(messages)) => {
            let body = views::apply_page(
                state.wizard.catalog(),
                Some(&submitted_position),
                &messages,
            );
            return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
        }
        Err(other) => return Err(other),
    };

    let body = views::interview_page(&draft, &questions, None, &[]);
    session.data.draft = Some(draft);
    session.data.authorization = None;
    let cookie = session
        .commit(state.sessions.as_ref(), state.cookies)
        .await?;
    Ok(with_cookie(cookie, Html(body)))
}

pub(crate) async fn interview_page_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
) -> Result<Response, WizardError> {
    let session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let draft = match guard(session.data.draft.as_ref(), WizardStep::InterviewPending) {
        Ok(draft) => draft,
        Err(redirect) => return Ok(redirect.into_response()),
    };
    let questions = state.wizard.questions_for(draft);
    Ok(Html(views::interview_page(draft, &questions, None, &[])).into_response())
}

pub(crate) async fn interview_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
    answers: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, WizardError> {
    let mut session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let mut draft = match guard(session.data.draft.as_ref(), WizardStep::InterviewPending) {
        Ok(draft) => draft.clone(),
        Err(redirect) => return Ok(redirect.into_response()),
    };
    let Form(answers) = answers.map_err(|rejection| {
        WizardError::Validation(vec![format!("interview form could not be read: {rejection}")])
    })?;

    match state.wizard.record_answers(&mut draft, &answers) {
        Ok(()) => {}
        Err(error @ WizardError::IncompleteInterview(_)) => {
            let questions = state.wizard.questions_for(&draft);
            let body =
                views::interview_page(&draft, &questions, Some(&answers), &error.messages());
            return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
        }
        Err(other) => return Err(other),
    }

    session.data.draft = Some(draft);
    let cookie = session
        .commit(state.sessions.as_ref(), state.cookies)
        .await?;
    Ok(with_cookie(cookie, Redirect::to(VERIFY_PATH)))
}

pub(crate) async fn verify_page_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
) -> Result<Response, WizardError> {
    let session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let draft = match guard(session.data.draft.as_ref(), WizardStep::VerificationPending) {
        Ok(draft) => draft,
        Err(redirect) => return Ok(redirect.into_response()),
    };
    let body = views::verify_page(draft, state.wizard.identity_configured(), &[]);
    Ok(Html(body).into_response())
}

/// Skip path. Serves both `/apply/verify` and `/apply/skip-idme`.
pub(crate) async fn verify_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, WizardError> {
    let mut session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let mut draft = match guard(session.data.draft.as_ref(), WizardStep::VerificationPending) {
        Ok(draft) => draft.clone(),
        Err(redirect) => return Ok(redirect.into_response()),
    };
    let multipart = multipart.map_err(|_| WizardError::MissingIdDocuments)?;

    let mut form = UploadedForm::read(multipart, &state.upload_dir, state.limits).await?;
    let id_front = form.take_file("idFront");
    let id_back = form.take_file("idBack");
    drop(form);

    match state
        .wizard
        .verify_with_documents(&mut draft, id_front, id_back)
        .await
    {
        Ok(()) => {}
        Err(error @ WizardError::MissingIdDocuments) => {
            let body =
                views::verify_page(&draft, state.wizard.identity_configured(), &error.messages());
            return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
        }
        Err(other) => return Err(other),
    }

    session.data.draft = Some(draft);
    session.data.authorization = None;
    let cookie = session
        .commit(state.sessions.as_ref(), state.cookies)
        .await?;
    Ok(with_cookie(cookie, Redirect::to(SUBMIT_PATH)))
}

pub(crate) async fn submit_page_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
) -> Result<Response, WizardError> {
    let session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    match guard(session.data.draft.as_ref(), WizardStep::ReadyToSubmit) {
        Ok(draft) => Ok(Html(views::submit_page(draft)).into_response()),
        Err(redirect) => Ok(redirect.into_response()),
    }
}

pub(crate) async fn submit_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
) -> Result<Response, WizardError> {
    let mut session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let draft = match guard(session.data.draft.as_ref(), WizardStep::ReadyToSubmit) {
        Ok(draft) => draft.clone(),
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let receipt = state.wizard.submit(&draft).await?;

    session.data.draft = None;
    session.data.authorization = None;
    let cookie = session
        .commit(state.sessions.as_ref(), state.cookies)
        .await?;
    let body = views::thank_you_page(&draft.applicant.first_name, &receipt);
    Ok(with_cookie(cookie, Html(body)))
}

pub(crate) async fn authorize_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
) -> Result<Response, WizardError> {
    let mut session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    if let Err(redirect) = guard(session.data.draft.as_ref(), WizardStep::VerificationPending) {
        return Ok(redirect.into_response());
    }
    if !state.wizard.identity_configured() {
        return Ok(Redirect::to(VERIFY_PATH).into_response());
    }

    let (pending, url) = state.wizard.begin_authorization().await?;
    session.data.authorization = Some(pending);
    let cookie = session
        .commit(state.sessions.as_ref(), state.cookies)
        .await?;
    Ok(with_cookie(cookie, Redirect::to(&url)))
}

pub(crate) async fn callback_handler(
    State(state): State<Arc<WizardState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response, WizardError> {
    let mut session = LoadedSession::load(state.sessions.as_ref(), &headers).await?;
    let mut draft = match guard(session.data.draft.as_ref(), WizardStep::VerificationPending) {
        Ok(draft) => draft.clone(),
        Err(redirect) => return Ok(redirect.into_response()),
    };

    state
        .wizard
        .complete_authorization(&mut draft, session.data.authorization.as_ref(), &params)
        .await?;

    session.data.draft = Some(draft);
    session.data.authorization = None;
    let cookie = session
        .commit(state.sessions.as_ref(), state.cookies)
        .await?;
    Ok(with_cookie(cookie, Redirect::to(SUBMIT_PATH)))
}
