mod lifecycle;
mod milestone;


pub use lifecycle::LifecycleMonitor;
pub use milestone::{MilestonePlan, NotificationState};
