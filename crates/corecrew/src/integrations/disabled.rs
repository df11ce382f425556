use async_trait::async_trait;
use tracing::debug;

use crate::workflows::hiring::wizard::{
    ConfirmationMailer, KeyValueStore, MailError, NotificationDispatcher, NotificationEvent,
    NotifyError, OutboundEmail, StoreError,
};

/// Drops events when no chat is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl NotificationDispatcher for DisabledNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        debug!(kind = event.kind(), "chat notifications disabled; event dropped");
        Ok(())
    }
}

/// Reports every write as failed so receipts show the record was not stored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStore;

#[async_trait]
impl KeyValueStore for DisabledStore {
    async fn put_hash(&self, key: &str, _fields: &[(String, String)]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(format!(
            "key-value store not configured; '{key}' not written"
        )))
    }

    async fn add_to_set(&self, key: &str, _member: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(format!(
            "key-value store not configured; '{key}' not written"
        )))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl ConfirmationMailer for DisabledMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        debug!(to = %email.to, "mail relay disabled; confirmation not sent");
        Ok(())
    }

    async fn probe(&self) -> Result<bool, MailError> {
        Ok(false)
    }
}
