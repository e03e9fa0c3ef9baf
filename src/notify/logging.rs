use super::{MessageId, NotificationSink};
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Sink that only logs posts, for dry runs and local development
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn post(&self, text: &str, in_reply_to: Option<&MessageId>) -> Result<MessageId> {
        let id = MessageId(Uuid::new_v4().to_string());
        match in_reply_to {
            Some(parent) => info!("[post {} -> {}] {}", id, parent, text),
            None => info!("[post {}] {}", id, text),
        }
        Ok(id)
    }
}
