mod marker;
mod watcher;


pub use marker::{FileMarker, MarkerSource};
pub use watcher::{FlatlineOutcome, HeartbeatWatcher};
