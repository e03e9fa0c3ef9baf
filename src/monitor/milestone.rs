use crate::spark::{ApplicationInfo, TaskSummary};
use std::fmt;
use std::time::Duration;

/// Where a run is in its announcement sequence.
///
/// Ordered: a run only ever moves forward through these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NotificationState {
    NotStarted,
    Started,
    /// The n-th progress milestone has been announced (1-based)
    Progress(usize),
}

impl fmt::Display for NotificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationState::NotStarted => f.write_str("NOT_STARTED"),
            NotificationState::Started => f.write_str("STARTED"),
            NotificationState::Progress(n) => write!(f, "PROGRESS_{}", n),
        }
    }
}

/// Ordered progress milestones, as offsets from monitor start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestonePlan {
    offsets: Vec<Duration>,
}

impl MilestonePlan {
    pub fn new(mut offsets: Vec<Duration>) -> Self {
        offsets.sort();
        offsets.dedup();
        Self { offsets }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Nothing is left to announce from `state`
    pub fn is_complete(&self, state: NotificationState) -> bool {
        match state {
            NotificationState::NotStarted => false,
            NotificationState::Started => self.offsets.is_empty(),
            NotificationState::Progress(n) => n >= self.offsets.len(),
        }
    }

    /// The milestone that follows `state`, with its offset, if it is due at `elapsed`
    pub fn due(
        &self,
        state: NotificationState,
        elapsed: Duration,
    ) -> Option<(NotificationState, Duration)> {
        let index = match state {
            NotificationState::NotStarted => return None,
            NotificationState::Started => 0,
            NotificationState::Progress(n) => n,
        };

        self.offsets
            .get(index)
            .filter(|offset| elapsed >= **offset)
            .map(|offset| (NotificationState::Progress(index + 1), *offset))
    }
}

pub(crate) fn start_message(greeting: &str, app: &ApplicationInfo) -> String {
    format!("{} {}\n\nID: {}", greeting, app.name, app.id)
}

pub(crate) fn progress_message(offset: Duration, summary: &TaskSummary) -> String {
    format!(
        "OK, {} in and still chugging...\nJob status: {} active / {} completed",
        describe_offset(offset),
        summary.active_tasks,
        summary.completed_tasks
    )
}

fn describe_offset(offset: Duration) -> String {
    let secs = offset.as_secs();
    match secs {
        60 => "one minute".to_string(),
        3600 => "one hour".to_string(),
        s if s > 0 && s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}
