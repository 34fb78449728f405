//! Configuration validation utilities.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("malformed YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A configuration value failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parse a human-friendly duration such as `2s`, `500ms`, or `1m30s`.
///
/// # Examples
///
/// ```
/// use fleetping::config::parse_duration;
///
/// assert_eq!(parse_duration("2s").unwrap().as_secs(), 2);
/// assert_eq!(parse_duration("1m30s").unwrap().as_secs(), 90);
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("empty duration".to_string());
    }
    humantime::parse_duration(trimmed).map_err(|e| format!("invalid duration '{trimmed}': {e}"))
}

/// Expand `${VAR}` and `${VAR:-default}` references against the process
/// environment. Unset variables without a fallback expand to the empty
/// string.
pub fn expand_env_vars(input: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\$\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?::-(?P<fallback>[^}]*))?\}")
            .expect("env var pattern is valid")
    });

    pattern
        .replace_all(input, |caps: &regex::Captures| {
            match std::env::var(&caps["name"]) {
                Ok(value) => value,
                Err(_) => caps
                    .name("fallback")
                    .map_or_else(String::new, |m| m.as_str().to_string()),
            }
        })
        .into_owned()
}
