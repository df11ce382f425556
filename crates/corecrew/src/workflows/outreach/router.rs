use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use super::service::{ContactMessage, NewsletterSignup, OutreachDesk, QuickApplication};
use crate::workflows::hiring::wizard::{UploadLimits, UploadedForm, WizardError};
use crate::workflows::site::views::{self, escape, layout, message_list};

pub struct OutreachState {
    pub desk: Arc<OutreachDesk>,
    pub upload_dir: PathBuf,
    pub limits: UploadLimits,
}

pub fn outreach_router(state: Arc<OutreachState>) -> Router {
    let quick_apply_limit = UploadLimits {
        max_files: 1,
        ..state.limits
    };

    Router::new()
        .route("/contact", get(contact_page_handler).post(contact_handler))
        .route("/newsletter", post(newsletter_handler))
        .route(
            "/quick-apply",
            post(quick_apply_handler).layer(DefaultBodyLimit::max(quick_apply_limit.body_limit())),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContactQuery {
    sent: Option<String>,
}

pub(crate) async fn contact_page_handler(Query(query): Query<ContactQuery>) -> Html<String> {
    Html(views::contact(query.sent.is_some()))
}

pub(crate) async fn contact_handler(
    State(state): State<Arc<OutreachState>>,
    Form(message): Form<ContactMessage>,
) -> Redirect {
    state.desk.contact(message).await;
    Redirect::to("/contact?sent=1")
}

pub(crate) async fn newsletter_handler(
    State(state): State<Arc<OutreachState>>,
    Form(signup): Form<NewsletterSignup>,
) -> Redirect {
    state.desk.subscribe(signup).await;
    Redirect::to("/")
}

pub(crate) async fn quick_apply_handler(
    State(state): State<Arc<OutreachState>>,
    multipart: Multipart,
) -> Result<Response, WizardError> {
    let limits = UploadLimits {
        max_files: 1,
        ..state.limits
    };
    let mut form = UploadedForm::read(multipart, &state.upload_dir, limits).await?;
    let resume = form.take_file("resume");
    let field = |name: &str| form.text(name).map(|value| value.trim().to_string()).unwrap_or_default();
    let application = QuickApplication {
        name: field("name"),
        email: field("email"),
        message: field("message"),
    };
    let name = application.name.clone();

    match state.desk.quick_apply(application, resume).await {
        Ok(()) => {
            let body = format!(
                "<h1>Thank you for applying, {}!</h1><p>We received your submission.</p>",
                escape(&name)
            );
            Ok(Html(layout("Quick apply", &body)).into_response())
        }
        Err(messages) => {
            let body = format!("<h1>Quick apply</h1>{}", message_list(&messages));
            Ok((StatusCode::BAD_REQUEST, Html(layout("Quick apply", &body))).into_response())
        }
    }
}
