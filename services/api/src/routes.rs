use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::warn;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn with_operational_routes(router: Router) -> Router {
    router
        .route("/healthz", get(healthcheck))
        .route("/healthz/email", get(email_probe))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProbeQuery {
    token: Option<String>,
}

/// Mail relay liveness, hidden unless `HEALTHZ_TOKEN` is configured.
pub(crate) async fn email_probe(
    Extension(state): Extension<AppState>,
    Query(query): Query<ProbeQuery>,
) -> impl IntoResponse {
    let Some(expected) = state.healthz_token.as_deref() else {
        return (StatusCode::NOT_FOUND, Json(json!({ "ok": false })));
    };
    if query.token.as_deref() != Some(expected) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "ok": false, "error": "invalid token" })),
        );
    }

    match tokio::time::timeout(PROBE_TIMEOUT, state.mailer.probe()).await {
        Ok(Ok(true)) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Ok(Ok(false)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ok": false, "error": "mail relay not configured or not answering" })),
        ),
        Ok(Err(err)) => {
            warn!(error = %err, "mail relay probe failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
        }
        Err(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(json!({ "ok": false, "error": "mail relay probe timed out" })),
        ),
    }
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
