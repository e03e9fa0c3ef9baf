use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A liveness marker maintained by the main workload.
///
/// Only presence and modification time matter; content is never read.
#[async_trait]
pub trait MarkerSource: Send + Sync {
    /// Location of the marker, for logs and errors
    fn path(&self) -> &Path;

    /// Last modification time, or an error if the marker cannot be stat'ed
    async fn last_modified(&self) -> io::Result<SystemTime>;
}

/// Heartbeat marker file on the shared EMR volume
#[derive(Debug, Clone)]
pub struct FileMarker {
    path: PathBuf,
}

impl FileMarker {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarkerSource for FileMarker {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn last_modified(&self) -> io::Result<SystemTime> {
        tokio::fs::metadata(&self.path).await?.modified()
    }
}
