mod chain;
mod logging;
mod memory;
mod queue;
mod x;


pub use chain::ReplyChain;
pub use logging::LogSink;
pub use memory::{RecordedPost, RecordingSink};
pub use queue::{Notifier, NotifierHandle, NotifierStats};
pub use x::{OAuth1Keys, XAuth, XSink};

use crate::config::{NotifyConfig, SinkKind};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier the posting service assigned to a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A channel that status posts are published to
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Check that the sink will accept posts. Called once before the first post.
    async fn verify(&self) -> Result<()> {
        Ok(())
    }

    /// Publish `text`, optionally as a reply to an earlier message
    async fn post(&self, text: &str, in_reply_to: Option<&MessageId>) -> Result<MessageId>;
}

/// Build the sink selected by `config`.
///
/// Credentials are checked later through [`NotificationSink::verify`].
pub fn sink_from_config(config: &NotifyConfig) -> Result<Arc<dyn NotificationSink>> {
    match config.sink {
        SinkKind::X => Ok(Arc::new(XSink::new(config)?)),
        SinkKind::Log => Ok(Arc::new(LogSink::new())),
    }
}
