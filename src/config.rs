//! Configuration module for the fleetping application.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Probing parameters (attempts, per-attempt timeout, polling interval)
//! - The ordered target list
//!
//! The configuration is read once at startup and consumed as an immutable
//! value; reconfiguration means loading a new list for the next cycle, never
//! editing the current one mid-cycle.

mod app;
mod validation;

pub use app::{AppConfig, MonitorConfig, TargetConfig, DEFAULT_INTERVAL};
pub use validation::{expand_env_vars, parse_duration, ConfigError};
