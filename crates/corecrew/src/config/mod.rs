use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::hiring::wizard::AnswerPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub wizard: WizardConfig,
    pub telegram: Option<TelegramConfig>,
    pub key_value: Option<KeyValueConfig>,
    pub smtp: Option<SmtpConfig>,
    pub identity: Option<IdentityConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            wizard: WizardConfig::from_env()?,
            telegram: TelegramConfig::from_env(),
            key_value: KeyValueConfig::from_env(),
            smtp: SmtpConfig::from_env()?,
            identity: IdentityConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the application wizard and its outbound calls.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    pub upload_dir: PathBuf,
    pub session_ttl: Duration,
    pub outbound_timeout: Duration,
    pub answer_policy: AnswerPolicy,
    /// Shared secret guarding `/healthz/email`; the probe is hidden when unset.
    pub healthz_token: Option<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            upload_dir: env::temp_dir(),
            session_ttl: Duration::from_secs(60 * 60),
            outbound_timeout: Duration::from_secs(10),
            answer_policy: AnswerPolicy::Lenient,
            healthz_token: None,
        }
    }
}

impl WizardConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let upload_dir = non_empty_var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let session_ttl = match non_empty_var("SESSION_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .and_then(|minutes| minutes.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidNumber("SESSION_TTL_MINUTES"))?,
            None => defaults.session_ttl,
        };

        let outbound_timeout = match non_empty_var("OUTBOUND_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber("OUTBOUND_TIMEOUT_SECS"))?,
            ),
            None => defaults.outbound_timeout,
        };

        let answer_policy = match non_empty_var("INTERVIEW_ANSWER_POLICY") {
            Some(raw) => AnswerPolicy::parse(&raw).ok_or(ConfigError::InvalidAnswerPolicy(raw))?,
            None => defaults.answer_policy,
        };

        Ok(Self {
            upload_dir,
            session_ttl,
            outbound_timeout,
            answer_policy,
            healthz_token: non_empty_var("HEALTHZ_TOKEN"),
        })
    }
}

/// Chat notification target (Telegram Bot API).
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl TelegramConfig {
    fn from_env() -> Option<Self> {
        let bot_token = non_empty_var("TELEGRAM_BOT_TOKEN")?;
        let chat_id = non_empty_var("TELEGRAM_CHAT_ID")?;
        let api_base = non_empty_var("TELEGRAM_API_BASE")
            .unwrap_or_else(|| "https://api.telegram.org".to_string());
        Some(Self {
            bot_token,
            chat_id,
            api_base,
        })
    }
}

/// REST endpoint of the key-value store used as the audit sink.
#[derive(Debug, Clone)]
pub struct KeyValueConfig {
    pub url: String,
    pub token: String,
}

impl KeyValueConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            url: non_empty_var("UPSTASH_REDIS_REST_URL")?,
            token: non_empty_var("UPSTASH_REDIS_REST_TOKEN")?,
        })
    }
}

/// Outbound mail relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub starttls: bool,
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(host), Some(from)) = (non_empty_var("SMTP_HOST"), non_empty_var("SMTP_FROM"))
        else {
            return Ok(None);
        };

        let port = match non_empty_var("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber("SMTP_PORT"))?,
            None => 587,
        };

        let starttls = non_empty_var("SMTP_TLS")
            .map(|raw| !matches!(raw.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Some(Self {
            host,
            port,
            username: non_empty_var("SMTP_USER"),
            password: non_empty_var("SMTP_PASS"),
            from,
            starttls,
        }))
    }
}

/// OpenID Connect client registration with the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub issuer: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
}

impl IdentityConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            issuer: non_empty_var("IDME_ISSUER")?,
            client_id: non_empty_var("IDME_CLIENT_ID")?,
            client_secret: non_empty_var("IDME_CLIENT_SECRET"),
            redirect_uri: non_empty_var("IDME_REDIRECT_URI")?,
            scope: non_empty_var("IDME_SCOPE")
                .unwrap_or_else(|| "openid email profile".to_string()),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber(&'static str),
    InvalidAnswerPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber(key) => write!(f, "{key} must be a valid number"),
            ConfigError::InvalidAnswerPolicy(value) => write!(
                f,
                "INTERVIEW_ANSWER_POLICY '{value}' must be one of lenient, placeholder, strict"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber(_)
            | ConfigError::InvalidAnswerPolicy(_) => None,
        }
    }
}
