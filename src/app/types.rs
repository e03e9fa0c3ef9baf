use crate::monitor::NotificationState;
use crate::notify::NotifierStats;
use std::time::SystemTime;

/// Component lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

/// Why the coordinator shut down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The driver's heartbeat went stale
    Flatline { last_heartbeat: SystemTime },
    /// The shared token was cancelled from outside, e.g. by a signal
    Cancelled,
}

/// Outcome of a complete coordinator run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: ShutdownReason,
    pub final_state: NotificationState,
    pub notifications: NotifierStats,
    pub exit_code: i32,
}
