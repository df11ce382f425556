use crate::cli::ServeArgs;
use crate::infra::{build_ports, AppState};
use crate::routes::with_operational_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use corecrew::config::AppConfig;
use corecrew::error::AppError;
use corecrew::telemetry;
use corecrew::workflows::hiring::wizard::{
    application_router, ApplicationWizard, CookiePolicy, MemorySessionStore, SessionStore,
    UploadLimits, WizardState,
};
use corecrew::workflows::hiring::PositionCatalog;
use corecrew::workflows::outreach::{outreach_router, OutreachDesk, OutreachState};
use corecrew::workflows::site::{site_router, views};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;
    tokio::fs::create_dir_all(&config.wizard.upload_dir).await?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let ports = build_ports(&config)?;
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        mailer: ports.mailer.clone(),
        healthz_token: config.wizard.healthz_token.as_deref().map(Arc::from),
    };

    let sessions: Arc<dyn SessionStore> =
        Arc::new(MemorySessionStore::new(config.wizard.session_ttl));
    spawn_session_sweeper(sessions.clone());

    let limits = UploadLimits::default();
    let outreach = OutreachState {
        desk: Arc::new(OutreachDesk::new(
            ports.notifier.clone(),
            ports.store.clone(),
            config.wizard.outbound_timeout,
        )),
        upload_dir: config.wizard.upload_dir.clone(),
        limits,
    };
    let wizard = WizardState {
        wizard: Arc::new(ApplicationWizard::new(
            ports,
            config.wizard.answer_policy,
            config.wizard.outbound_timeout,
        )),
        sessions,
        cookies: CookiePolicy {
            secure: config.environment.is_production(),
            max_age: config.wizard.session_ttl,
        },
        upload_dir: config.wizard.upload_dir.clone(),
        limits,
    };

    let app = with_operational_routes(
        Router::new()
            .merge(site_router(Arc::new(PositionCatalog::standard())))
            .merge(application_router(Arc::new(wizard)))
            .merge(outreach_router(Arc::new(outreach))),
    )
    .fallback(not_found)
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "careers site ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn not_found() -> axum::response::Response {
    views::not_found()
}

/// Drop idle wizard sessions on a fixed interval for the life of the process.
fn spawn_session_sweeper(sessions: Arc<dyn SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "expired wizard sessions removed"),
                Err(err) => warn!(error = %err, "session sweep failed"),
            }
        }
    });
}
