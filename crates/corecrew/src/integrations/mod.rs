//! HTTP, SMTP, and OpenID Connect adapters behind the wizard's ports, plus the no-op
//! stand-ins used when an integration is not configured.

pub mod disabled;
pub mod idme;
pub mod smtp;
pub mod telegram;
pub mod upstash;

use std::time::Duration;

pub use disabled::{DisabledMailer, DisabledNotifier, DisabledStore};
pub use idme::OidcProvider;
pub use smtp::SmtpMailer;
pub use telegram::TelegramNotifier;
pub use upstash::UpstashStore;

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("http client could not be built: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("mail relay '{host}' is not usable: {reason}")]
    Smtp { host: String, reason: String },
    #[error("sender address '{0}' is not valid")]
    Sender(String),
}

/// Shared client settings for every outbound HTTP adapter.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, IntegrationError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("corecrew/", env!("CARGO_PKG_VERSION")))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()?;
    Ok(client)
}

/// Compact error text for logs; upstream bodies can be large HTML pages.
pub(crate) fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 300;
    match body.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}
