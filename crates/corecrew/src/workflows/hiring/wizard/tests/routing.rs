use axum::http::StatusCode;
use axum::response::IntoResponse;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::hiring::wizard::{
    AnswerPolicy, LoadedSession, SessionStore, WizardError,
};

async fn started(harness: &Harness, router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/start",
            None,
            &start_parts("Data Entry"),
        ))
        .await
        .expect("start response");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie");
    assert_eq!(harness.staged_files(), 0);
    cookie
}

#[tokio::test]
async fn later_steps_without_a_draft_redirect_to_entry() {
    let harness = Harness::new();
    let router = harness.router(false);

    let requests = vec![
        get_request("/apply/interview", None),
        form_request("/apply/interview", None, "experience=lots"),
        get_request("/apply/verify", None),
        multipart_request("/apply/verify", None, &[]),
        multipart_request("/apply/skip-idme", None, &[]),
        get_request("/apply/submit", None),
        form_request("/apply/submit", None, ""),
        get_request("/auth/idme", None),
        get_request("/auth/idme/callback?code=x&state=y", None),
    ];
    for request in requests {
        let uri = request.uri().to_string();
        let response = router.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response).as_deref(), Some("/apply"), "{uri}");
    }
    assert!(harness.notifier.events().is_empty());
}

#[tokio::test]
async fn verification_before_interview_goes_back_to_interview() {
    let harness = Harness::new();
    let router = harness.router(false);
    let cookie = started(&harness, &router).await;

    let response = router
        .clone()
        .oneshot(get_request("/apply/verify", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply/interview"));

    let response = router
        .oneshot(get_request("/apply/submit", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(location(&response).as_deref(), Some("/apply"));
}

#[tokio::test]
async fn full_skip_flow_over_http() {
    let harness = Harness::new();
    let router = harness.router(false);

    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/start",
            None,
            &start_parts("Drivers (truck, delivery, fleet)"),
        ))
        .await
        .expect("start");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie");
    let page = body_text(response).await;
    assert!(page.contains("name=\"license_class\""));
    assert_eq!(harness.staged_files(), 0);

    let response = router
        .clone()
        .oneshot(form_request(
            "/apply/interview",
            Some(&cookie),
            "license_class=Class+A&experience=six+years",
        ))
        .await
        .expect("interview");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply/verify"));

    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/verify",
            Some(&cookie),
            &[
                ("idFront", Some(("front.jpg", "image/jpeg")), b"front".as_slice()),
                ("idBack", Some(("back.jpg", "image/jpeg")), b"back".as_slice()),
            ],
        ))
        .await
        .expect("verify");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply/submit"));
    assert_eq!(harness.staged_files(), 0);

    let response = router
        .clone()
        .oneshot(get_request("/apply/submit", Some(&cookie)))
        .await
        .expect("review");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("skip"));

    let response = router
        .clone()
        .oneshot(form_request("/apply/submit", Some(&cookie), ""))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .expect("cleared cookie");
    assert!(cleared.contains("Max-Age=0"));
    assert!(body_text(response).await.contains("Thank you, Ana!"));

    assert_eq!(harness.store.hashes().len(), 1);
    assert_eq!(harness.mailer.sent().len(), 1);
    assert_eq!(harness.sessions.len().await, 0);

    let response = router
        .oneshot(get_request("/apply/submit", Some(&cookie)))
        .await
        .expect("after submit");
    assert_eq!(location(&response).as_deref(), Some("/apply"));
}

#[tokio::test]
async fn warehouse_applicant_skips_provider_and_cannot_resume() {
    let harness = Harness::new();
    let router = harness.router(false);

    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/start",
            None,
            &start_parts("Warehouse Staff & Forklift Operators"),
        ))
        .await
        .expect("start");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie");
    let page = body_text(response).await;
    assert!(page.contains("name=\"forklift_certification\""));
    assert_eq!(harness.notifier.kinds(), vec!["text", "file"]);

    let response = router
        .clone()
        .oneshot(form_request(
            "/apply/interview",
            Some(&cookie),
            "forklift_certification=yes&warehouse_experience=four+years&lifting=50+lbs\
             &safety_incident=none&shift_preference=nights",
        ))
        .await
        .expect("interview");
    assert_eq!(location(&response).as_deref(), Some("/apply/verify"));

    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/skip-idme",
            Some(&cookie),
            &[
                ("idFront", Some(("front.jpg", "image/jpeg")), b"front".as_slice()),
                ("idBack", Some(("back.jpg", "image/jpeg")), b"back".as_slice()),
            ],
        ))
        .await
        .expect("skip");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply/submit"));

    let response = router
        .clone()
        .oneshot(form_request("/apply/submit", Some(&cookie), ""))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        harness.notifier.kinds(),
        vec!["text", "file", "json", "json", "file", "file", "text"]
    );
    assert_eq!(harness.store.hashes().len(), 1);
    assert_eq!(harness.mailer.sent().len(), 1);
    assert_eq!(harness.staged_files(), 0);

    let response = router
        .oneshot(get_request("/apply/interview", Some(&cookie)))
        .await
        .expect("interview after submit");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply"));
}

#[tokio::test]
async fn non_multipart_start_rerenders_entry() {
    let harness = Harness::new();
    let router = harness.router(false);
    let response = router
        .oneshot(form_request("/apply/start", None, "firstName=Ana"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&response).is_none());
    let page = body_text(response).await;
    assert!(page.contains("application form could not be read"));
    assert!(page.contains("action=\"/apply/start\""));
    assert!(harness.notifier.events().is_empty());
}

#[tokio::test]
async fn strict_interview_keeps_typed_answers() {
    let harness = Harness::with_policy(AnswerPolicy::Strict);
    let router = harness.router(false);
    let cookie = started(&harness, &router).await;

    let response = router
        .clone()
        .oneshot(form_request(
            "/apply/interview",
            Some(&cookie),
            "experience=ten+years+of+typing",
        ))
        .await
        .expect("interview");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let page = body_text(response).await;
    assert!(page.contains(">ten years of typing</textarea>"));
    assert!(page.contains("availability"));

    let response = router
        .oneshot(get_request("/apply/verify", Some(&cookie)))
        .await
        .expect("verify page");
    assert_eq!(location(&response).as_deref(), Some("/apply/interview"));
}

#[test]
fn unverified_submission_error_redirects_to_entry() {
    let response = WizardError::NotVerified.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply"));
}

#[tokio::test]
async fn invalid_start_rerenders_entry() {
    let harness = Harness::new();
    let router = harness.router(false);
    let response = router
        .oneshot(multipart_request(
            "/apply/start",
            None,
            &[
                ("firstName", None, b"Ana".as_slice()),
                ("email", None, b"nope".as_slice()),
                ("position", None, b"Data Entry".as_slice()),
            ],
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&response).is_none());
    let page = body_text(response).await;
    assert!(page.contains("last name is required"));
    assert!(page.contains("email address is not valid"));
    assert!(harness.notifier.events().is_empty());
}

#[tokio::test]
async fn one_sided_id_upload_is_rejected() {
    let harness = Harness::new();
    let router = harness.router(false);
    let cookie = started(&harness, &router).await;
    router
        .clone()
        .oneshot(form_request("/apply/interview", Some(&cookie), ""))
        .await
        .expect("interview");

    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/skip-idme",
            Some(&cookie),
            &[("idFront", Some(("front.jpg", "image/jpeg")), b"front".as_slice())],
        ))
        .await
        .expect("verify");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("both sides"));
    assert_eq!(harness.staged_files(), 0);

    let response = router
        .oneshot(get_request("/apply/submit", Some(&cookie)))
        .await
        .expect("submit page");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply"));
}

#[tokio::test]
async fn too_many_documents_are_rejected() {
    let harness = Harness::new();
    let router = harness.router(false);
    let mut parts = start_parts("Data Entry");
    for _ in 0..7 {
        parts.push(("documents", Some(("extra.txt", "text/plain")), b"x".as_slice()));
    }

    let response = router
        .oneshot(multipart_request("/apply/start", None, &parts))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.notifier.events().is_empty());
    assert_eq!(harness.staged_files(), 0);
}

#[tokio::test]
async fn chat_outage_does_not_block_submission() {
    let harness = Harness::with_notifier(RecordingNotifier::failing());
    let router = harness.router(false);
    let cookie = started(&harness, &router).await;
    router
        .clone()
        .oneshot(form_request("/apply/interview", Some(&cookie), "experience=yes"))
        .await
        .expect("interview");
    let response = router
        .clone()
        .oneshot(multipart_request(
            "/apply/verify",
            Some(&cookie),
            &[
                ("idFront", Some(("front.png", "image/png")), b"front".as_slice()),
                ("idBack", Some(("back.png", "image/png")), b"back".as_slice()),
            ],
        ))
        .await
        .expect("verify");
    assert_eq!(location(&response).as_deref(), Some("/apply/submit"));

    let response = router
        .oneshot(form_request("/apply/submit", Some(&cookie), ""))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.sessions.len().await, 0);
}

#[tokio::test]
async fn authorize_without_provider_returns_to_verify() {
    let harness = Harness::new();
    let router = harness.router(false);
    let cookie = started(&harness, &router).await;
    router
        .clone()
        .oneshot(form_request("/apply/interview", Some(&cookie), ""))
        .await
        .expect("interview");

    let response = router
        .oneshot(get_request("/auth/idme", Some(&cookie)))
        .await
        .expect("authorize");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply/verify"));
}

#[tokio::test]
async fn forged_callback_state_never_reaches_the_provider() {
    let harness = Harness::new();
    let router = harness.router(true);
    let cookie = started(&harness, &router).await;
    router
        .clone()
        .oneshot(form_request("/apply/interview", Some(&cookie), ""))
        .await
        .expect("interview");

    let response = router
        .clone()
        .oneshot(get_request("/auth/idme", Some(&cookie)))
        .await
        .expect("authorize");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).expect("provider url");
    assert!(target.starts_with("https://idp.test/authorize"));

    let response = router
        .clone()
        .oneshot(get_request(
            "/auth/idme/callback?code=good-code&state=forged",
            Some(&cookie),
        ))
        .await
        .expect("callback");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.identity.exchanges(), 0);

    let response = router
        .oneshot(get_request("/apply/submit", Some(&cookie)))
        .await
        .expect("submit page");
    assert_eq!(location(&response).as_deref(), Some("/apply"));
}

#[tokio::test]
async fn provider_round_trip_verifies_the_draft() {
    let harness = Harness::new();
    let router = harness.router(true);
    let cookie = started(&harness, &router).await;
    router
        .clone()
        .oneshot(form_request("/apply/interview", Some(&cookie), ""))
        .await
        .expect("interview");
    router
        .clone()
        .oneshot(get_request("/auth/idme", Some(&cookie)))
        .await
        .expect("authorize");

    let headers = {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            cookie.parse().expect("cookie header"),
        );
        headers
    };
    let sessions: &dyn SessionStore = harness.sessions.as_ref();
    let session = LoadedSession::load(sessions, &headers).await.expect("session");
    let state = session
        .data
        .authorization
        .as_ref()
        .map(|pending| pending.state.clone())
        .expect("pending authorization");

    let response = router
        .clone()
        .oneshot(get_request(
            &format!("/auth/idme/callback?code=good-code&state={state}"),
            Some(&cookie),
        ))
        .await
        .expect("callback");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/apply/submit"));
    assert_eq!(harness.identity.exchanges(), 1);

    let response = router
        .oneshot(get_request("/apply/submit", Some(&cookie)))
        .await
        .expect("review");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("identity_provider"));
}
