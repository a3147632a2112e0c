use crate::core::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Console configuration.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// LIKE pattern identifying fake accounts by login
    pub fake_account_pattern: String,

    /// Access level carried by fake accounts
    pub fake_access_level: i64,

    /// Delay before the first periodic refresh
    pub refresh_initial_delay_ms: u64,

    /// Interval between periodic refreshes
    pub refresh_interval_ms: u64,

    /// Rows per page in the operator view
    pub page_size: usize,

    /// Largest batch accepted by create
    pub max_batch_count: i32,

    /// Largest jitter radius accepted by create and spawn
    pub max_radius: i32,

    /// Radius the operator view starts with
    pub default_radius: i32,

    /// `tracing` env-filter directive used by the binary
    pub log_filter: String,
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self {
            fake_account_pattern: "AutoPilot_%".to_string(),
            fake_access_level: -1,
            refresh_initial_delay_ms: 1_000,
            refresh_interval_ms: 2_000,
            page_size: 10,
            max_batch_count: 500,
            max_radius: 5_000,
            default_radius: 120,
            log_filter: "info".to_string(),
        }
    }

    pub fn fake_accounts(mut self, pattern: &str, access_level: i64) -> Self {
        self.fake_account_pattern = pattern.to_string();
        self.fake_access_level = access_level;
        self
    }

    pub fn refresh_initial_delay(mut self, delay: Duration) -> Self {
        self.refresh_initial_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn max_batch_count(mut self, max: i32) -> Self {
        self.max_batch_count = max;
        self
    }

    pub fn max_radius(mut self, max: i32) -> Self {
        self.max_radius = max;
        self
    }

    pub fn log_filter(mut self, filter: &str) -> Self {
        self.log_filter = filter.to_string();
        self
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Loads a JSON configuration file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ConsoleConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fake_account_pattern.is_empty() {
            return Err(ConsoleError::Config(
                "fake_account_pattern cannot be empty".to_string(),
            ));
        }

        if self.refresh_interval_ms == 0 {
            return Err(ConsoleError::Config(
                "refresh_interval_ms must be > 0".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(ConsoleError::Config("page_size must be > 0".to_string()));
        }

        if self.max_batch_count <= 0 {
            return Err(ConsoleError::Config(
                "max_batch_count must be > 0".to_string(),
            ));
        }

        if self.max_radius < 0 || self.default_radius < 0 || self.default_radius > self.max_radius {
            return Err(ConsoleError::Config(
                "radius bounds must satisfy 0 <= default_radius <= max_radius".to_string(),
            ));
        }

        Ok(())
    }

    /// Upper bound on operator batch size. Non-positive counts are left to
    /// the caller, which treats them as an empty batch.
    pub fn validate_count(&self, count: i32) -> Result<()> {
        if count > self.max_batch_count {
            return Err(ConsoleError::validation(format!(
                "Count must be at most {}.",
                self.max_batch_count
            )));
        }
        Ok(())
    }

    pub fn validate_radius(&self, radius: i32) -> Result<()> {
        if radius > self.max_radius {
            return Err(ConsoleError::validation(format!(
                "Radius must be at most {}.",
                self.max_radius
            )));
        }
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new()
    }
}
