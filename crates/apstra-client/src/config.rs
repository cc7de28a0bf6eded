//! Client configuration
//!
//! Configuration is a plain struct with sensible defaults. Callers either
//! fill it in directly or load it from the environment with
//! [`ClientConfig::from_env`].

use crate::error::ApstraError;
use std::env;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Environment variable holding the Apstra base URL
pub const ENV_APSTRA_URL: &str = "APSTRA_URL";
/// Environment variable holding the Apstra username
pub const ENV_APSTRA_USER: &str = "APSTRA_USER";
/// Environment variable holding the Apstra password
pub const ENV_APSTRA_PASS: &str = "APSTRA_PASS";
/// Environment variable overriding the per-request timeout (seconds)
pub const ENV_APSTRA_TIMEOUT_SECS: &str = "APSTRA_TIMEOUT_SECS";
/// Environment variable enabling experimental mode
pub const ENV_APSTRA_EXPERIMENTAL: &str = "APSTRA_EXPERIMENTAL";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timing and sizing for the background task monitor
#[derive(Debug, Clone)]
pub struct TaskMonitorConfig {
    /// Delay between a new registration and the first status poll
    pub first_check_delay: Duration,
    /// Poll interval while any task remains pending
    pub poll_interval: Duration,
    /// Capacity of the registration queue
    pub queue_depth: usize,
}

impl Default for TaskMonitorConfig {
    fn default() -> Self {
        Self {
            first_check_delay: Duration::from_millis(100),
            poll_interval: Duration::from_millis(500),
            queue_depth: 64,
        }
    }
}

/// Apstra client configuration
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Apstra base URL (e.g., "https://apstra.example.com")
    pub url: String,
    /// API/UI username
    pub user: String,
    /// API/UI password
    pub pass: String,
    /// Per-request HTTP timeout; `None` uses [`DEFAULT_TIMEOUT`]
    pub timeout: Option<Duration>,
    /// Accept server API versions outside the supported set
    pub experimental: bool,
    /// Task monitor timing
    pub task_monitor: TaskMonitorConfig,
    /// Receives asynchronous errors (task polling failures). When unset
    /// those errors are logged.
    pub error_sink: Option<mpsc::UnboundedSender<ApstraError>>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("experimental", &self.experimental)
            .field("task_monitor", &self.task_monitor)
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with credentials and defaults for everything else
    pub fn new(url: impl Into<String>, user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            pass: pass.into(),
            ..Default::default()
        }
    }

    /// Load configuration from `APSTRA_*` environment variables
    pub fn from_env() -> Result<Self, ApstraError> {
        let required = |name: &str| {
            env::var(name).map_err(|e| {
                ApstraError::InvalidConfig(format!("{} environment variable is required - {}", name, e))
            })
        };

        let mut cfg = Self::new(
            required(ENV_APSTRA_URL)?,
            required(ENV_APSTRA_USER)?,
            required(ENV_APSTRA_PASS)?,
        );

        if let Ok(raw) = env::var(ENV_APSTRA_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                ApstraError::InvalidConfig(format!("{} '{}' is not a number - {}", ENV_APSTRA_TIMEOUT_SECS, raw, e))
            })?;
            cfg.timeout = Some(Duration::from_secs(secs));
        }

        if let Ok(raw) = env::var(ENV_APSTRA_EXPERIMENTAL) {
            cfg.experimental = parse_bool(&raw);
        }

        Ok(cfg)
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable experimental mode
    #[must_use]
    pub fn with_experimental(mut self, experimental: bool) -> Self {
        self.experimental = experimental;
        self
    }

    /// Override task monitor timing
    #[must_use]
    pub fn with_task_monitor(mut self, task_monitor: TaskMonitorConfig) -> Self {
        self.task_monitor = task_monitor;
        self
    }

    /// Route asynchronous errors to `sink` instead of the log
    #[must_use]
    pub fn with_error_sink(mut self, sink: mpsc::UnboundedSender<ApstraError>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Effective per-request timeout
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Reject configurations which cannot possibly work
    pub fn validate(&self) -> Result<(), ApstraError> {
        if self.url.trim().is_empty() {
            return Err(ApstraError::InvalidConfig("Url for Apstra service cannot be empty".to_string()));
        }
        if self.user.is_empty() {
            return Err(ApstraError::InvalidConfig("username for Apstra service cannot be empty".to_string()));
        }
        if self.pass.is_empty() {
            return Err(ApstraError::InvalidConfig("password for Apstra service cannot be empty".to_string()));
        }
        if self.task_monitor.queue_depth == 0 {
            return Err(ApstraError::InvalidConfig("task monitor queue depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
