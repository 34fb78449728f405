//! Application configuration structures.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::{ProbeOptions, Target, DEFAULT_ATTEMPTS, DEFAULT_TIMEOUT};

use super::validation::{expand_env_vars, ConfigError};

// =============================================================================
// Constants
// =============================================================================

/// Default polling interval between cycles (5 seconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

fn default_attempts() -> u32 {
    DEFAULT_ATTEMPTS
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

// =============================================================================
// Monitor Configuration
// =============================================================================

/// Probing parameters forwarded into every polling cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Echo attempts per probe (default: 4).
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Per-attempt timeout (default: 2s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Polling interval between cycles (default: 5s).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl MonitorConfig {
    /// Probe options derived from these parameters.
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions::new(self.attempts, self.timeout)
    }
}

// =============================================================================
// Target Configuration
// =============================================================================

/// One configured target entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Network address (IP or resolvable hostname).
    pub address: String,

    /// Optional display label; a placeholder (`host-N`) is generated when
    /// unset.
    #[serde(default)]
    pub label: Option<String>,
}

impl TargetConfig {
    /// Create a target entry without a label.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: None,
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Probing parameters.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Ordered target list.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Environment variables in the file are expanded (`${VAR}`,
    /// `${VAR:-default}`) before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&expand_env_vars(&content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.attempts == 0 {
            return Err(ConfigError::Invalid(
                "monitor attempts must be at least 1".to_string(),
            ));
        }

        if self.monitor.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "monitor timeout must be positive".to_string(),
            ));
        }

        if self.monitor.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "monitor interval must be positive".to_string(),
            ));
        }

        let mut seen_addresses = HashSet::new();
        for target in &self.targets {
            if target.address.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "target address cannot be empty".to_string(),
                ));
            }
            if !seen_addresses.insert(target.address.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate target address: '{}'",
                    target.address
                )));
            }
        }

        Ok(())
    }

    /// Ordered target list for a polling cycle, with placeholder labels
    /// filled in for unlabelled entries.
    pub fn to_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, entry)| match &entry.label {
                Some(label) => Target::new(&entry.address, label),
                None => Target::unlabelled(&entry.address, index),
            })
            .collect()
    }
}
