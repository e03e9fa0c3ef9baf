use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable EMR sets to the shared volume holding the heartbeat marker
pub const EMR_COMMS_MOUNT_ENV: &str = "EMR_COMMS_MOUNT";

/// OAuth 1.0a credentials for the posting API
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const CONSUMER_KEY_ENV: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET_ENV: &str = "CONSUMER_SECRET";

/// OAuth 2.0 user-context bearer token, used when no OAuth 1.0a key is set
pub const BEARER_TOKEN_ENV: &str = "X_BEARER_TOKEN";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SparkwatchConfig {
    pub heartbeat: HeartbeatConfig,
    pub monitor: MonitorConfig,
    pub spark: SparkConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HeartbeatConfig {
    /// Shared volume the main container writes its heartbeat into
    #[serde(default = "default_mount_dir")]
    pub mount_dir: String,

    /// File name of the heartbeat marker inside `mount_dir`
    #[serde(default = "default_marker_name")]
    pub marker_name: String,

    /// How long to wait for the marker to appear before giving up
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_seconds: u64,

    /// How often to check for the marker during startup
    #[serde(default = "default_startup_poll")]
    pub startup_poll_seconds: u64,

    /// How often to stat the marker once the job is running
    #[serde(default = "default_heartbeat_poll")]
    pub poll_interval_seconds: u64,

    /// Age of the last observed heartbeat after which the job counts as gone
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitorConfig {
    /// How often to poll the Spark status API
    #[serde(default = "default_monitor_poll")]
    pub poll_interval_seconds: u64,

    /// Progress milestones, in seconds since the monitor started
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u64>,

    /// Opening line of the "job starting" post
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SparkConfig {
    /// Base URL of the driver's REST API
    #[serde(default = "default_spark_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    /// Which sink receives posts
    #[serde(default = "default_sink")]
    pub sink: SinkKind,

    /// Base URL of the posting API
    #[serde(default = "default_notify_endpoint")]
    pub endpoint: String,

    // Secrets are read but never written back out
    #[serde(default, skip_serializing)]
    pub consumer_key: Option<String>,
    #[serde(default, skip_serializing)]
    pub consumer_secret: Option<String>,
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing)]
    pub access_token_secret: Option<String>,
    #[serde(default, skip_serializing)]
    pub bearer_token: Option<String>,

    /// Closing post sent after the job flatlines; empty disables it
    #[serde(default = "default_final_message")]
    pub final_message: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Post to the X API
    X,
    /// Only log what would have been posted
    Log,
}

impl SparkwatchConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("sparkwatch.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let milestones: Vec<i64> = default_milestones().into_iter().map(|m| m as i64).collect();

        let settings = Config::builder()
            // Start with default values
            .set_default("heartbeat.mount_dir", default_mount_dir())?
            .set_default("heartbeat.marker_name", default_marker_name())?
            .set_default(
                "heartbeat.startup_timeout_seconds",
                default_startup_timeout(),
            )?
            .set_default("heartbeat.startup_poll_seconds", default_startup_poll())?
            .set_default("heartbeat.poll_interval_seconds", default_heartbeat_poll())?
            .set_default(
                "heartbeat.stale_threshold_seconds",
                default_stale_threshold(),
            )?
            .set_default("monitor.poll_interval_seconds", default_monitor_poll())?
            .set_default("monitor.milestones", milestones)?
            .set_default("monitor.greeting", default_greeting())?
            .set_default("spark.base_url", default_spark_base_url())?
            .set_default(
                "spark.request_timeout_seconds",
                default_request_timeout(),
            )?
            .set_default("notify.sink", "x")?
            .set_default("notify.endpoint", default_notify_endpoint())?
            .set_default("notify.final_message", default_final_message())?
            .set_default(
                "notify.request_timeout_seconds",
                default_request_timeout(),
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables, e.g. SPARKWATCH_MONITOR__POLL_INTERVAL_SECONDS
            .add_source(
                Environment::with_prefix("SPARKWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("monitor.milestones"),
            )
            // The EMR pod template and the credential secret use their own names
            .set_override_option(
                "heartbeat.mount_dir",
                std::env::var(EMR_COMMS_MOUNT_ENV).ok(),
            )?
            .set_override_option(
                "notify.consumer_key",
                std::env::var(CONSUMER_KEY_ENV).ok(),
            )?
            .set_override_option(
                "notify.consumer_secret",
                std::env::var(CONSUMER_SECRET_ENV).ok(),
            )?
            .set_override_option(
                "notify.access_token",
                std::env::var(ACCESS_TOKEN_ENV).ok(),
            )?
            .set_override_option(
                "notify.access_token_secret",
                std::env::var(ACCESS_TOKEN_SECRET_ENV).ok(),
            )?
            .set_override_option(
                "notify.bearer_token",
                std::env::var(BEARER_TOKEN_ENV).ok(),
            )?
            .build()?;

        let config: SparkwatchConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!(
            "Final configuration: heartbeat={:?} monitor={:?} spark={:?} sink={:?}",
            config.heartbeat, config.monitor, config.spark, config.notify.sink
        );

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat.marker_name.trim().is_empty() {
            return Err(ConfigError::Message(
                "Heartbeat marker_name must not be empty".to_string(),
            ));
        }

        if self.heartbeat.startup_poll_seconds == 0 {
            return Err(ConfigError::Message(
                "Heartbeat startup_poll_seconds must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat.poll_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "Heartbeat poll_interval_seconds must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat.stale_threshold_seconds < self.heartbeat.poll_interval_seconds {
            return Err(ConfigError::Message(
                "Heartbeat stale_threshold_seconds must be at least poll_interval_seconds"
                    .to_string(),
            ));
        }

        if self.monitor.poll_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "Monitor poll_interval_seconds must be greater than 0".to_string(),
            ));
        }

        if self.monitor.milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Message(
                "Monitor milestones must be strictly increasing".to_string(),
            ));
        }

        if self.spark.base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "Spark base_url must not be empty".to_string(),
            ));
        }

        if self.notify.sink == SinkKind::X {
            crate::notify::XAuth::from_config(&self.notify)
                .map_err(|e| ConfigError::Message(e.to_string()))?;
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> crate::error::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl HeartbeatConfig {
    pub fn marker_path(&self) -> PathBuf {
        Path::new(&self.mount_dir).join(&self.marker_name)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_seconds)
    }

    pub fn startup_poll(&self) -> Duration {
        Duration::from_secs(self.startup_poll_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn stale_threshold(&self) -> Duration {
        Duration::from_secs(self.stale_threshold_seconds)
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn milestone_offsets(&self) -> Vec<Duration> {
        self.milestones
            .iter()
            .map(|secs| Duration::from_secs(*secs))
            .collect()
    }
}

impl SparkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl NotifyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for SparkwatchConfig {
    fn default() -> Self {
        Self {
            heartbeat: HeartbeatConfig {
                mount_dir: default_mount_dir(),
                marker_name: default_marker_name(),
                startup_timeout_seconds: default_startup_timeout(),
                startup_poll_seconds: default_startup_poll(),
                poll_interval_seconds: default_heartbeat_poll(),
                stale_threshold_seconds: default_stale_threshold(),
            },
            monitor: MonitorConfig {
                poll_interval_seconds: default_monitor_poll(),
                milestones: default_milestones(),
                greeting: default_greeting(),
            },
            spark: SparkConfig {
                base_url: default_spark_base_url(),
                request_timeout_seconds: default_request_timeout(),
            },
            notify: NotifyConfig {
                sink: default_sink(),
                endpoint: default_notify_endpoint(),
                consumer_key: None,
                consumer_secret: None,
                access_token: None,
                access_token_secret: None,
                bearer_token: None,
                final_message: default_final_message(),
                request_timeout_seconds: default_request_timeout(),
            },
        }
    }
}

// Default value functions
fn default_mount_dir() -> String {
    "/var/log/fluentd".to_string()
}
fn default_marker_name() -> String {
    "main-container-terminated".to_string()
}
fn default_startup_timeout() -> u64 {
    60
}
fn default_startup_poll() -> u64 {
    1
}
fn default_heartbeat_poll() -> u64 {
    5
}
fn default_stale_threshold() -> u64 {
    15
}

fn default_monitor_poll() -> u64 {
    5
}
fn default_milestones() -> Vec<u64> {
    vec![60]
}
fn default_greeting() -> String {
    "Hey! A new Spark app is starting...! 💁‍♂️".to_string()
}

fn default_spark_base_url() -> String {
    "http://localhost:4040".to_string()
}
fn default_request_timeout() -> u64 {
    5
}

fn default_sink() -> SinkKind {
    SinkKind::X
}
fn default_notify_endpoint() -> String {
    "https://api.twitter.com".to_string()
}
fn default_final_message() -> String {
    "We're all done! 👋".to_string()
}
