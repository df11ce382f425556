use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use corecrew::config::AppConfig;
use corecrew::error::AppError;
use corecrew::integrations::{
    http_client, DisabledMailer, DisabledNotifier, DisabledStore, OidcProvider, SmtpMailer,
    TelegramNotifier, UpstashStore,
};
use corecrew::workflows::hiring::wizard::{
    ConfirmationMailer, KeyValueStore, NotificationDispatcher, WizardPorts,
};
use corecrew::workflows::hiring::IdentityProvider;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) mailer: Arc<dyn ConfirmationMailer>,
    pub(crate) healthz_token: Option<Arc<str>>,
}

/// Build every outbound adapter from configuration. Missing integrations fall back to the
/// disabled stand-ins so the wizard keeps working without them.
pub(crate) fn build_ports(config: &AppConfig) -> Result<WizardPorts, AppError> {
    let client = http_client(config.wizard.outbound_timeout)?;

    let notifier: Arc<dyn NotificationDispatcher> = match &config.telegram {
        Some(telegram) => {
            info!(chat_id = %telegram.chat_id, "chat notifications enabled");
            Arc::new(TelegramNotifier::new(client.clone(), telegram))
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set; chat notifications disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let store: Arc<dyn KeyValueStore> = match &config.key_value {
        Some(key_value) => Arc::new(UpstashStore::new(client.clone(), key_value)),
        None => {
            warn!("UPSTASH_REDIS_REST_URL/TOKEN not set; applications will not be stored");
            Arc::new(DisabledStore)
        }
    };

    let mailer: Arc<dyn ConfirmationMailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp, config.wizard.outbound_timeout)?),
        None => {
            warn!("SMTP_HOST/SMTP_FROM not set; confirmation emails disabled");
            Arc::new(DisabledMailer)
        }
    };

    let identity: Option<Arc<dyn IdentityProvider>> = match &config.identity {
        Some(identity) => {
            info!(issuer = %identity.issuer, "identity provider enabled");
            Some(Arc::new(OidcProvider::new(client, identity.clone())))
        }
        None => {
            info!("identity provider not configured; only document verification offered");
            None
        }
    };

    Ok(WizardPorts {
        notifier,
        store,
        mailer,
        identity,
    })
}
