use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparkwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Timed out after {waited:?} waiting for heartbeat marker at {}", path.display())]
    StartupTimeout { path: PathBuf, waited: Duration },

    #[error("Status API error: {message}")]
    Status { message: String },

    #[error("Status API returned no applications")]
    NoApplication,

    #[error("Status API returned {count} applications, expected exactly one")]
    AmbiguousApplication { count: usize },

    #[error("Post failed: {message}")]
    Post { message: String },

    #[error("System error: {message}")]
    System { message: String },
}

impl SparkwatchError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn status<S: Into<String>>(message: S) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn post<S: Into<String>>(message: S) -> Self {
        Self::Post {
            message: message.into(),
        }
    }

    /// Whether the error ends the process rather than the current poll.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StartupTimeout { .. } | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, SparkwatchError>;
