//! OpenID Connect client for the identity provider: discovery, authorization URL with PKCE,
//! code exchange, and user-info retrieval.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use super::truncate_body;
use crate::config::IdentityConfig;
use crate::workflows::hiring::identity::{
    IdentityError, IdentityProfile, IdentityProvider, PendingAuthorization, TokenSet,
};

#[derive(Debug, Clone, Deserialize)]
struct ProviderMetadata {
    authorization_endpoint: String,
    token_endpoint: String,
    #[serde(default)]
    userinfo_endpoint: Option<String>,
}

pub struct OidcProvider {
    client: Client,
    config: IdentityConfig,
    metadata: OnceCell<ProviderMetadata>,
}

impl OidcProvider {
    pub fn new(client: Client, config: IdentityConfig) -> Self {
        Self {
            client,
            config,
            metadata: OnceCell::new(),
        }
    }

    /// Discovery document, fetched once; a failed fetch is retried on the next request.
    async fn metadata(&self) -> Result<&ProviderMetadata, IdentityError> {
        self.metadata
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/.well-known/openid-configuration",
                    self.config.issuer.trim_end_matches('/')
                );
                debug!(%url, "discovering identity provider");
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|err| IdentityError::Discovery(err.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(IdentityError::Discovery(format!("{status} from {url}")));
                }
                response
                    .json::<ProviderMetadata>()
                    .await
                    .map_err(|err| IdentityError::Discovery(err.to_string()))
            })
            .await
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    async fn authorization_url(
        &self,
        pending: &PendingAuthorization,
    ) -> Result<String, IdentityError> {
        let metadata = self.metadata().await?;
        let challenge = pending.code_challenge();
        let url = Url::parse_with_params(
            &metadata.authorization_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
                ("state", pending.state.as_str()),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", "S256"),
            ],
        )
        .map_err(|err| IdentityError::Discovery(err.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, IdentityError> {
        let metadata = self.metadata().await?;
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .client
            .post(&metadata.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|err| IdentityError::TokenExchange(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::TokenExchange(format!(
                "{status}: {}",
                truncate_body(&body)
            )));
        }
        response
            .json::<TokenSet>()
            .await
            .map_err(|err| IdentityError::TokenExchange(err.to_string()))
    }

    async fn user_info(&self, tokens: &TokenSet) -> Result<IdentityProfile, IdentityError> {
        let metadata = self.metadata().await?;
        let endpoint = metadata.userinfo_endpoint.as_deref().ok_or_else(|| {
            IdentityError::UserInfo("provider does not publish a user-info endpoint".to_string())
        })?;

        let response = self
            .client
            .get(endpoint)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|err| IdentityError::UserInfo(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::UserInfo(status.to_string()));
        }
        let claims = response
            .json::<Value>()
            .await
            .map_err(|err| IdentityError::UserInfo(err.to_string()))?;
        Ok(IdentityProfile::from_claims(claims))
    }
}
