use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde_json::json;
use tokio_util::io::ReaderStream;

use super::truncate_body;
use crate::config::TelegramConfig;
use crate::workflows::hiring::wizard::{NotificationDispatcher, NotificationEvent, NotifyError};

/// Bot API limit for a single text message, in characters.
const MESSAGE_LIMIT: usize = 4096;

/// Delivers wizard events to a Telegram chat through the Bot API.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
        }
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let text: String = text.chars().take(MESSAGE_LIMIT).collect();
        let response = self
            .client
            .post(format!("{}/sendMessage", self.endpoint))
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await
            .map_err(transport)?;
        check(response).await
    }

    async fn send_document(&self, document: Part, caption: Option<String>) -> Result<(), NotifyError> {
        let mut form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part("document", document);
        if let Some(caption) = caption {
            form = form.text("caption", caption);
        }

        let response = self
            .client
            .post(format!("{}/sendDocument", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        check(response).await
    }
}

#[async_trait]
impl NotificationDispatcher for TelegramNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        match event {
            NotificationEvent::TextSummary(text) => self.send_message(&text).await,
            NotificationEvent::JsonArtifact { filename, payload } => {
                let bytes = serde_json::to_vec_pretty(&payload)
                    .map_err(|err| NotifyError::Transport(err.to_string()))?;
                let part = Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str("application/json")
                    .map_err(transport)?;
                self.send_document(part, None).await
            }
            NotificationEvent::FileAttachment {
                path,
                filename,
                mime_type,
                caption,
            } => {
                let file = tokio::fs::File::open(&path).await?;
                let length = file.metadata().await?.len();
                let body = Body::wrap_stream(ReaderStream::new(file));
                let part = Part::stream_with_length(body, length)
                    .file_name(filename)
                    .mime_str(&mime_type)
                    .map_err(transport)?;
                self.send_document(part, caption).await
            }
        }
    }
}

fn transport(err: reqwest::Error) -> NotifyError {
    NotifyError::Transport(err.to_string())
}

async fn check(response: Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Rejected(format!(
        "{status}: {}",
        truncate_body(&body)
    )))
}
