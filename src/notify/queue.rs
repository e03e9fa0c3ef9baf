use super::{MessageId, NotificationSink, ReplyChain};
use crate::error::{Result, SparkwatchError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Counters reported by the notification worker when it stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifierStats {
    pub sent: usize,
    pub failed: usize,
    pub last_message: Option<MessageId>,
}

/// Producer side of the notification queue.
///
/// The worker keeps running until every handle has been closed or dropped and
/// the queue is drained.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    sender: mpsc::UnboundedSender<String>,
}

impl NotifierHandle {
    /// Queue `text` for posting
    pub fn send<S: Into<String>>(&self, text: S) -> Result<()> {
        self.sender
            .send(text.into())
            .map_err(|_| SparkwatchError::system("Notification worker has stopped"))
    }

    /// Stop accepting messages through this handle
    pub fn close(self) {
        drop(self);
    }
}

/// Single consumer that owns the sink and the reply chain
pub struct Notifier;

impl Notifier {
    /// Spawn the worker draining the queue into `sink`
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> (NotifierHandle, JoinHandle<NotifierStats>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(notification_worker(receiver, sink));
        (NotifierHandle { sender }, worker)
    }
}

async fn notification_worker(
    mut queue_rx: mpsc::UnboundedReceiver<String>,
    sink: Arc<dyn NotificationSink>,
) -> NotifierStats {
    info!("Notification worker started");

    let mut chain = ReplyChain::new();
    let mut stats = NotifierStats::default();

    while let Some(text) = queue_rx.recv().await {
        info!("Sending a post: {:?}", text);

        match chain.post(sink.as_ref(), &text).await {
            Ok(id) => {
                debug!("Posted message {}", id);
                stats.sent += 1;
            }
            Err(e) => {
                error!("Failed to post update: {}", e);
                stats.failed += 1;
            }
        }
    }

    stats.last_message = chain.last().cloned();
    info!(
        "Notification worker stopped ({} sent, {} failed)",
        stats.sent, stats.failed
    );
    stats
}
