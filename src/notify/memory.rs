use super::{MessageId, NotificationSink};
use crate::error::{Result, SparkwatchError};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

/// One post attempt seen by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    pub text: String,
    pub in_reply_to: Option<MessageId>,
    /// `None` if the attempt was made to fail
    pub id: Option<MessageId>,
    pub at: Instant,
}

/// In-memory sink that records every attempt, for tests and embedding
#[derive(Debug, Default)]
pub struct RecordingSink {
    posts: Mutex<Vec<RecordedPost>>,
    failures_pending: Mutex<usize>,
    credentials_rejected: Mutex<bool>,
    verifications: Mutex<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` post attempts fail
    pub fn fail_next(&self, count: usize) {
        *self.failures_pending.lock() += count;
    }

    /// Make [`NotificationSink::verify`] fail
    pub fn reject_credentials(&self) {
        *self.credentials_rejected.lock() = true;
    }

    pub fn verifications(&self) -> usize {
        *self.verifications.lock()
    }

    /// Every attempt so far, failed ones included
    pub fn attempts(&self) -> Vec<RecordedPost> {
        self.posts.lock().clone()
    }

    /// Successful posts only
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts
            .lock()
            .iter()
            .filter(|post| post.id.is_some())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn verify(&self) -> Result<()> {
        *self.verifications.lock() += 1;
        if *self.credentials_rejected.lock() {
            return Err(SparkwatchError::post("Credential check returned 401 Unauthorized"));
        }
        Ok(())
    }

    async fn post(&self, text: &str, in_reply_to: Option<&MessageId>) -> Result<MessageId> {
        let fail = {
            let mut pending = self.failures_pending.lock();
            if *pending > 0 {
                *pending -= 1;
                true
            } else {
                false
            }
        };

        let mut posts = self.posts.lock();
        let id = (!fail).then(|| MessageId(format!("post-{}", posts.len() + 1)));
        posts.push(RecordedPost {
            text: text.to_string(),
            in_reply_to: in_reply_to.cloned(),
            id: id.clone(),
            at: Instant::now(),
        });

        id.ok_or_else(|| SparkwatchError::post("injected failure"))
    }
}
