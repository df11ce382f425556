use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::truncate_body;
use crate::config::KeyValueConfig;
use crate::workflows::hiring::wizard::{KeyValueStore, StoreError};

/// Redis commands sent to an Upstash REST endpoint, one JSON array per command.
pub struct UpstashStore {
    client: Client,
    url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl UpstashStore {
    pub fn new(client: Client, config: &KeyValueConfig) -> Self {
        Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    async fn command(&self, args: Vec<String>) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        match serde_json::from_str::<CommandReply>(&body) {
            Ok(CommandReply {
                error: Some(error), ..
            }) => Err(StoreError::Rejected(error)),
            Ok(reply) if status.is_success() => Ok(reply.result.unwrap_or(Value::Null)),
            _ => Err(StoreError::Rejected(format!(
                "{status}: {}",
                truncate_body(&body)
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for UpstashStore {
    async fn put_hash(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut args = Vec::with_capacity(2 + fields.len() * 2);
        args.push("HSET".to_string());
        args.push(key.to_string());
        for (field, value) in fields {
            args.push(field.clone());
            args.push(value.clone());
        }
        self.command(args).await.map(|_| ())
    }

    async fn add_to_set(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.command(vec!["SADD".to_string(), key.to_string(), member.to_string()])
            .await
            .map(|_| ())
    }
}
