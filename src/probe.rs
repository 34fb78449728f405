//! Probe Layer
//!
//! Reachability probing of individual targets. A [`Prober`] reduces a series
//! of echo attempts against one [`Target`] to a [`ProbeOutcome`], absorbing
//! every failure path into the tri-state [`Verdict`].
//!
//! - [`Target`]: a monitoring subject (network address plus display label)
//! - [`Verdict`]: tri-state reachability classification
//! - [`ProbeOutcome`]: verdict and latency for one probe pass
//! - [`ProbeOptions`]: attempt count and per-attempt timeout
//! - [`Prober`]: trait implemented by probe backends
//! - [`IcmpProber`]: ICMP echo implementation

mod icmp;

pub use icmp::IcmpProber;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default number of echo attempts per probe.
pub const DEFAULT_ATTEMPTS: u32 = 4;

/// Default per-attempt timeout (2 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Maximum echo attempts per probe, bounded by the ICMP sequence field.
pub const MAX_ATTEMPTS: u32 = u16::MAX as u32;

/// A monitoring subject: network address plus human-readable label.
///
/// Immutable for the duration of one polling cycle; the configured set is
/// replaced wholesale between cycles, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Network address (IP or resolvable hostname). Unique within a
    /// configured set.
    pub address: String,
    /// Display label.
    pub label: String,
}

impl Target {
    /// Create a target with an explicit label.
    pub fn new(address: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: label.into(),
        }
    }

    /// Create a target with a generated placeholder label (`host-N`, 1-based
    /// on its position in the configured list).
    pub fn unlabelled(address: impl Into<String>, index: usize) -> Self {
        Self {
            address: address.into(),
            label: format!("host-{}", index + 1),
        }
    }
}

/// Tri-state reachability classification of a single probe pass.
///
/// `ProbeError` is deliberately distinct from `Unreachable`: it signals a
/// local or configuration problem (resolution failure, missing ICMP
/// permission) rather than a remote host being down, and operators need to
/// tell the two apart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// At least one echo reply arrived before its timeout.
    Reachable,
    /// Every attempt went unanswered: a clean negative result.
    Unreachable,
    /// The probe itself could not run (resolution, permission, transport).
    ProbeError,
}

impl Verdict {
    /// Whether this verdict counts as reachable. `Unreachable` and
    /// `ProbeError` both count as not-reachable for fleet tallies.
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Result of one probe pass against one target.
///
/// Created fresh each cycle and never mutated; discarded once the cycle's
/// snapshot supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    /// Reachability classification.
    pub verdict: Verdict,
    /// Mean round-trip time over answered attempts, in milliseconds.
    /// `None` unless the verdict is `Reachable`; never a numeric stand-in,
    /// so a real 0 ms reading stays distinguishable from "no data".
    pub latency_ms: Option<f64>,
    /// When the probe pass completed.
    pub observed_at: DateTime<Utc>,
}

impl ProbeOutcome {
    /// Outcome for a target that answered at least one echo request.
    pub fn reachable(latency_ms: f64) -> Self {
        Self {
            verdict: Verdict::Reachable,
            latency_ms: Some(latency_ms),
            observed_at: Utc::now(),
        }
    }

    /// Outcome for a target that answered none of the echo requests.
    pub fn unreachable() -> Self {
        Self {
            verdict: Verdict::Unreachable,
            latency_ms: None,
            observed_at: Utc::now(),
        }
    }

    /// Outcome for a probe that could not run at all.
    pub fn probe_error() -> Self {
        Self {
            verdict: Verdict::ProbeError,
            latency_ms: None,
            observed_at: Utc::now(),
        }
    }
}

/// Probing parameters forwarded to every probe within a polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Echo attempts per probe pass.
    pub attempts: u32,
    /// Upper bound on each individual attempt, not the whole pass. A probe
    /// never blocks longer than `attempts * per_attempt_timeout` plus a
    /// small fixed overhead.
    pub per_attempt_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            per_attempt_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProbeOptions {
    /// Create probe options.
    ///
    /// Attempts are clamped into `1..=MAX_ATTEMPTS`.
    pub fn new(attempts: u32, per_attempt_timeout: Duration) -> Self {
        let clamped = attempts.clamp(1, MAX_ATTEMPTS);
        if clamped != attempts {
            tracing::warn!(
                attempts,
                clamped,
                "Attempt count outside allowed range, clamping"
            );
        }
        Self {
            attempts: clamped,
            per_attempt_timeout,
        }
    }
}

/// Trait implemented by probe backends.
///
/// # Error Handling
///
/// `probe` is infallible by signature: a target that cannot be probed is a
/// valid observation (`Verdict::ProbeError`), not an error to propagate. This
/// keeps a polling cycle total even when individual probes fail, and it is
/// what lets the aggregator treat every target uniformly.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Probe one target and reduce the attempts to a single outcome.
    async fn probe(&self, target: &Target, opts: &ProbeOptions) -> ProbeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let opts = ProbeOptions::default();
        assert_eq!(opts.attempts, DEFAULT_ATTEMPTS);
        assert_eq!(opts.per_attempt_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_options_clamp_zero_attempts() {
        let opts = ProbeOptions::new(0, Duration::from_secs(1));
        assert_eq!(opts.attempts, 1);
    }

    #[test]
    fn test_options_clamp_excessive_attempts() {
        let opts = ProbeOptions::new(u32::MAX, Duration::from_secs(1));
        assert_eq!(opts.attempts, MAX_ATTEMPTS);
    }

    #[test]
    fn test_target_generated_label() {
        let target = Target::unlabelled("10.0.0.7", 2);
        assert_eq!(target.address, "10.0.0.7");
        assert_eq!(target.label, "host-3");
    }

    #[test]
    fn test_verdict_reachability() {
        assert!(Verdict::Reachable.is_reachable());
        assert!(!Verdict::Unreachable.is_reachable());
        assert!(!Verdict::ProbeError.is_reachable());
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Reachable.to_string(), "reachable");
        assert_eq!(Verdict::ProbeError.to_string(), "probe_error");
    }

    #[test]
    fn test_outcome_latency_sentinel() {
        assert_eq!(ProbeOutcome::reachable(0.0).latency_ms, Some(0.0));
        assert_eq!(ProbeOutcome::unreachable().latency_ms, None);
        assert_eq!(ProbeOutcome::probe_error().latency_ms, None);
    }
}
