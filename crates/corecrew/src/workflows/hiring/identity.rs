//! Identity verification boundary: PKCE material, the pending-authorization record kept in the
//! session, and the provider trait implemented by the OpenID Connect client.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Verifier/state pair stored in the session between the redirect and the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: String,
}

impl PendingAuthorization {
    pub fn generate() -> Self {
        Self {
            state: random_token(),
            code_verifier: random_token(),
        }
    }

    /// S256 code challenge derived from the stored verifier.
    pub fn code_challenge(&self) -> String {
        code_challenge(&self.code_verifier)
    }

    pub fn state_matches(&self, returned: &str) -> bool {
        self.state.as_bytes().ct_eq(returned.as_bytes()).into()
    }
}

/// 32 random bytes, base64url without padding (43 characters).
fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Verified attributes returned by the provider's user-info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub subject: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Full claim set as returned, forwarded to reviewers untouched.
    pub claims: serde_json::Value,
}

impl IdentityProfile {
    pub fn from_claims(claims: serde_json::Value) -> Self {
        let text = |name: &str| {
            claims
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        Self {
            subject: text("sub"),
            email: text("email"),
            given_name: text("given_name").or_else(|| text("fname")),
            family_name: text("family_name").or_else(|| text("lname")),
            claims,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider is not configured")]
    NotConfigured,
    #[error("authorization state is missing or does not match")]
    StateMismatch,
    #[error("authorization code missing from callback")]
    MissingCode,
    #[error("identity provider returned an error: {0}")]
    Provider(String),
    #[error("identity provider discovery failed: {0}")]
    Discovery(String),
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("user-info request failed: {0}")]
    UserInfo(String),
    #[error("identity provider did not answer in time")]
    Timeout,
}

/// OAuth2 / OIDC provider used by the verification step.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization endpoint URL carrying the PKCE challenge and state.
    async fn authorization_url(
        &self,
        pending: &PendingAuthorization,
    ) -> Result<String, IdentityError>;

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, IdentityError>;

    async fn user_info(&self, tokens: &TokenSet) -> Result<IdentityProfile, IdentityError>;
}
