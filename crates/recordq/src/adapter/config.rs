use std::time::Duration;
use tracing::Level;

/// Configuration for [`LoggedDatabase`](super::LoggedDatabase).
///
/// Logging is enabled by default at `DEBUG` with SQL truncated to 200 bytes.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether statements are logged at all.
    pub enabled: bool,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are additionally logged at `WARN`.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

impl LogConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Set the slow query threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Enable logging.
    pub fn enable_logging(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Disable logging.
    pub fn disable_logging(mut self) -> Self {
        self.enabled = false;
        self
    }
}
