use super::{MessageId, NotificationSink};
use crate::error::Result;

/// Keeps a series of posts threaded as one reply chain.
///
/// Each post replies to the last post that succeeded; a failed post never
/// becomes the reply target.
#[derive(Debug, Default)]
pub struct ReplyChain {
    last: Option<MessageId>,
}

impl ReplyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent successfully posted message, if any
    pub fn last(&self) -> Option<&MessageId> {
        self.last.as_ref()
    }

    pub async fn post(&mut self, sink: &dyn NotificationSink, text: &str) -> Result<MessageId> {
        let id = sink.post(text, self.last.as_ref()).await?;
        self.last = Some(id.clone());
        Ok(id)
    }
}
