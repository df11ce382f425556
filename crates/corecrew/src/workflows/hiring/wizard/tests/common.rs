use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Utc;
use serde_json::json;

use crate::workflows::hiring::identity::{
    IdentityError, IdentityProfile, IdentityProvider, PendingAuthorization, TokenSet,
};
use crate::workflows::hiring::wizard::{
    application_router, ApplicantIdentity, ApplicationDraft, ApplicationWizard, AnswerPolicy,
    ConfirmationMailer, CookiePolicy, KeyValueStore, MailError, MemorySessionStore,
    NotificationDispatcher, NotificationEvent, NotifyError, OutboundEmail, StoreError,
    UploadLimits, Verification, WizardPorts, WizardState,
};

#[derive(Default)]
pub(super) struct RecordingNotifier {
    pub(super) events: Mutex<Vec<NotificationEvent>>,
    pub(super) fail: bool,
    /// File contents captured at send time, keyed by filename.
    pub(super) files: Mutex<HashMap<String, Vec<u8>>>,
}

impl RecordingNotifier {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(NotificationEvent::kind).collect()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        if let NotificationEvent::FileAttachment { path, filename, .. } = &event {
            let bytes = std::fs::read(path)?;
            self.files
                .lock()
                .expect("notifier mutex poisoned")
                .insert(filename.clone(), bytes);
        }
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        if self.fail {
            Err(NotifyError::Transport("chat unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) hashes: Mutex<Vec<(String, Vec<(String, String)>)>>,
    pub(super) fail: bool,
}

impl MemoryStore {
    pub(super) fn hashes(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.hashes.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put_hash(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.hashes
            .lock()
            .expect("store mutex poisoned")
            .push((key.to_string(), fields.to_vec()));
        Ok(())
    }

    async fn add_to_set(&self, _key: &str, _member: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct RecordingMailer {
    pub(super) sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl ConfirmationMailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }

    async fn probe(&self) -> Result<bool, MailError> {
        Ok(true)
    }
}

/// Identity provider that accepts one code and counts every exchange attempt.
#[derive(Default)]
pub(super) struct FakeIdentity {
    pub(super) exchanges: AtomicUsize,
}

impl FakeIdentity {
    pub(super) fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn authorization_url(
        &self,
        pending: &PendingAuthorization,
    ) -> Result<String, IdentityError> {
        Ok(format!(
            "https://idp.test/authorize?state={}&code_challenge={}&code_challenge_method=S256",
            pending.state,
            pending.code_challenge()
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        _code_verifier: &str,
    ) -> Result<TokenSet, IdentityError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if code != "good-code" {
            return Err(IdentityError::TokenExchange("invalid_grant".to_string()));
        }
        Ok(TokenSet {
            access_token: "access".to_string(),
            token_type: Some("Bearer".to_string()),
            id_token: None,
            expires_in: Some(300),
        })
    }

    async fn user_info(&self, _tokens: &TokenSet) -> Result<IdentityProfile, IdentityError> {
        Ok(IdentityProfile::from_claims(json!({
            "sub": "idme-42",
            "email": "ana@example.com",
            "given_name": "Ana",
            "family_name": "Lee",
        })))
    }
}

pub(super) struct Harness {
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) mailer: Arc<RecordingMailer>,
    pub(super) identity: Arc<FakeIdentity>,
    pub(super) sessions: Arc<MemorySessionStore>,
    pub(super) upload_dir: tempfile::TempDir,
    pub(super) policy: AnswerPolicy,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub(super) fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self {
            notifier: Arc::new(notifier),
            store: Arc::new(MemoryStore::default()),
            mailer: Arc::new(RecordingMailer::default()),
            identity: Arc::new(FakeIdentity::default()),
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(3600))),
            upload_dir: tempfile::tempdir().expect("upload dir"),
            policy: AnswerPolicy::Lenient,
        }
    }

    pub(super) fn with_policy(policy: AnswerPolicy) -> Self {
        Self {
            policy,
            ..Self::new()
        }
    }

    pub(super) fn wizard(&self, with_identity: bool) -> ApplicationWizard {
        let identity: Option<Arc<dyn IdentityProvider>> = if with_identity {
            Some(self.identity.clone())
        } else {
            None
        };
        ApplicationWizard::new(
            WizardPorts {
                notifier: self.notifier.clone(),
                store: self.store.clone(),
                mailer: self.mailer.clone(),
                identity,
            },
            self.policy,
            Duration::from_secs(2),
        )
    }

    pub(super) fn router(&self, with_identity: bool) -> Router {
        application_router(Arc::new(WizardState {
            wizard: Arc::new(self.wizard(with_identity)),
            sessions: self.sessions.clone(),
            cookies: CookiePolicy {
                secure: false,
                max_age: Duration::from_secs(3600),
            },
            upload_dir: self.upload_dir.path().to_path_buf(),
            limits: UploadLimits::default(),
        }))
    }

    pub(super) fn staged_files(&self) -> usize {
        count_files(self.upload_dir.path())
    }
}

pub(super) fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

pub(super) fn draft(position: &str) -> ApplicationDraft {
    ApplicationDraft {
        applicant: ApplicantIdentity {
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: "ana@example.com".to_string(),
            phone: Some("310-555-0100".to_string()),
        },
        position: position.to_string(),
        catalog_key: None,
        cover_letter: None,
        attachments: Vec::new(),
        interview_answers: None,
        verification: Verification::Unverified,
        started_at: Utc::now(),
    }
}

pub(super) const BOUNDARY: &str = "corecrewtestboundary";

/// Multipart part: (field name, optional (filename, content type), body).
pub(super) type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

pub(super) fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(super) fn multipart_request(uri: &str, cookie: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(multipart_body(parts)))
        .expect("request")
}

pub(super) fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub(super) fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

/// `name=value` pair from a response's Set-Cookie header.
pub(super) fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

pub(super) fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub(super) async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub(super) fn start_parts(position: &str) -> Vec<Part<'_>> {
    vec![
        ("firstName", None, b"Ana".as_slice()),
        ("lastName", None, b"Lee".as_slice()),
        ("email", None, b"ana@example.com".as_slice()),
        ("phone", None, b"310-555-0100".as_slice()),
        ("position", None, position.as_bytes()),
        (
            "documents",
            Some(("resume.pdf", "application/pdf")),
            b"%PDF-1.4 resume".as_slice(),
        ),
    ]
}
