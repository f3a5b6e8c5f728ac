#![forbid(unsafe_code)]

//! Studio configuration.
//!
//! The embedding page may pass a JSON object to override any field; missing
//! fields take their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The options string is not valid JSON for [`StudioConfig`].
    Parse(String),
    /// The options parsed but describe an unusable configuration.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid studio options: {msg}"),
            Self::Invalid(msg) => write!(f, "unusable studio options: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Generation endpoint (POST).
    pub endpoint: String,
    pub min_count: u32,
    pub max_count: u32,
    /// Used when the count input holds no integer.
    pub default_count: u32,
    /// How long a status message stays visible.
    pub message_duration_ms: u64,
    /// Distance between a tooltip and its anchor.
    pub tooltip_gap: f64,
    /// Space kept between a shifted tooltip and the viewport's right edge.
    pub viewport_margin: f64,
    /// Download file name prefix; the date and `.txt` are appended.
    pub download_prefix: String,
    /// `tracing` filter directive for the browser console.
    pub log_filter: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/generate".to_string(),
            min_count: 1,
            max_count: 100,
            default_count: 50,
            message_duration_ms: 3000,
            tooltip_gap: 10.0,
            viewport_margin: 10.0,
            download_prefix: "cutup-phrases".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl StudioConfig {
    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint is empty".into()));
        }
        if self.min_count < 1 {
            return Err(ConfigError::Invalid("min_count must be at least 1".into()));
        }
        if self.min_count > self.max_count {
            return Err(ConfigError::Invalid(format!(
                "min_count {} exceeds max_count {}",
                self.min_count, self.max_count
            )));
        }
        if !(self.min_count..=self.max_count).contains(&self.default_count) {
            return Err(ConfigError::Invalid(format!(
                "default_count {} outside {}..={}",
                self.default_count, self.min_count, self.max_count
            )));
        }
        if !(self.tooltip_gap >= 0.0 && self.viewport_margin >= 0.0) {
            return Err(ConfigError::Invalid(
                "tooltip_gap and viewport_margin must be non-negative".into(),
            ));
        }
        if self.download_prefix.is_empty() {
            return Err(ConfigError::Invalid("download_prefix is empty".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn message_duration(&self) -> Duration {
        Duration::from_millis(self.message_duration_ms)
    }
}
