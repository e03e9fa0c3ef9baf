pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod monitor;
pub mod notify;
pub mod spark;

#[cfg(test)]
mod test_support;

pub use app::{ComponentState, Coordinator, RunSummary, ShutdownReason};
pub use clock::{Clock, SystemClock};
pub use config::{SinkKind, SparkwatchConfig};
pub use error::{Result, SparkwatchError};
pub use heartbeat::{FileMarker, FlatlineOutcome, HeartbeatWatcher, MarkerSource};
pub use monitor::{LifecycleMonitor, MilestonePlan, NotificationState};
pub use notify::{
    LogSink, MessageId, NotificationSink, Notifier, NotifierHandle, NotifierStats, RecordingSink,
    ReplyChain, XSink,
};
pub use spark::{ApplicationInfo, JobRecord, JobStatus, SparkStatusClient, StatusSource, TaskSummary};
