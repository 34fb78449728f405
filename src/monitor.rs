//! Monitor Layer
//!
//! One polling cycle fans probes out across the configured fleet, performs a
//! full join, and reduces the outcomes to a [`FleetSnapshot`].
//!
//! - [`StatusAggregator`]: runs one concurrent polling cycle
//! - [`FleetSnapshot`]: point-in-time aggregate over the fleet
//! - [`HostReport`]: one target's outcome inside a snapshot

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::probe::{ProbeOptions, ProbeOutcome, Prober, Target};

/// One target's probe outcome within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostReport {
    /// The probed target.
    pub target: Target,
    /// What the probe observed.
    pub outcome: ProbeOutcome,
}

impl HostReport {
    /// Whether this report belongs in the alert set.
    pub fn is_alert(&self) -> bool {
        !self.outcome.verdict.is_reachable()
    }
}

/// Point-in-time aggregate over one polling cycle.
///
/// Reports preserve the configured target order, never completion or
/// reachability order. A snapshot is immutable once built and superseded,
/// not merged, by the next cycle's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSnapshot {
    /// One report per configured target, in configured order.
    pub reports: Vec<HostReport>,
    /// Number of reports with a `Reachable` verdict.
    pub reachable_count: usize,
    /// Number of reports with any other verdict. `Unreachable` and
    /// `ProbeError` both count here.
    pub unreachable_count: usize,
    /// Arithmetic mean latency over reachable reports only; `None` when no
    /// report is reachable.
    pub mean_latency_ms: Option<f64>,
    /// Configured-order subsequence of reports with a non-reachable verdict.
    pub alerts: Vec<HostReport>,
    /// When the snapshot was completed.
    pub generated_at: DateTime<Utc>,
}

impl FleetSnapshot {
    /// Reduce reports, already in configured order, to a snapshot.
    fn from_reports(reports: Vec<HostReport>) -> Self {
        let reachable_count = reports.iter().filter(|r| !r.is_alert()).count();
        let unreachable_count = reports.len() - reachable_count;

        // Reachable reports only; a latency on any other verdict is ignored
        // rather than trusted, since outcomes can come from any Prober impl
        let latencies: Vec<f64> = reports
            .iter()
            .filter(|r| r.outcome.verdict.is_reachable())
            .filter_map(|r| r.outcome.latency_ms)
            .collect();
        let mean_latency_ms = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
        };

        let alerts = reports.iter().filter(|r| r.is_alert()).cloned().collect();

        Self {
            reports,
            reachable_count,
            unreachable_count,
            mean_latency_ms,
            alerts,
            generated_at: Utc::now(),
        }
    }

    /// Whether every configured target was reachable this cycle.
    pub fn is_healthy(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Runs one polling cycle: fan out, full join, reduce.
///
/// The aggregator holds no state across cycles. Each [`poll_all`] call is a
/// function of the target list and probe options alone, so overlapping
/// re-polls and wholesale target-list replacement between cycles need no
/// coordination here.
///
/// [`poll_all`]: StatusAggregator::poll_all
#[derive(Debug)]
pub struct StatusAggregator<P: Prober> {
    prober: Arc<P>,
    opts: ProbeOptions,
}

impl<P: Prober> StatusAggregator<P> {
    /// Create an aggregator over the given prober and probe options.
    pub fn new(prober: P, opts: ProbeOptions) -> Self {
        Self {
            prober: Arc::new(prober),
            opts,
        }
    }

    /// Probe every target concurrently and reduce the outcomes to a snapshot.
    ///
    /// One task is spawned per target, so a slow or stuck probe delays the
    /// cycle only up to its own timeout ceiling, never other targets. The
    /// cycle completes only when every target has an outcome: a probe that
    /// cannot run (or a panicked probe task) is absorbed into that target's
    /// report as `ProbeError`, never surfaced as a cycle failure. Reports
    /// keep the configured target order regardless of completion order.
    pub async fn poll_all(&self, targets: &[Target]) -> FleetSnapshot {
        let mut handles = Vec::with_capacity(targets.len());
        for target in targets.iter().cloned() {
            let prober = Arc::clone(&self.prober);
            let opts = self.opts;
            let probe_target = target.clone();
            let handle =
                tokio::spawn(async move { prober.probe(&probe_target, &opts).await });
            handles.push((target, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (target, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        address = %target.address,
                        label = %target.label,
                        error = %e,
                        "Probe task failed"
                    );
                    ProbeOutcome::probe_error()
                }
            };
            reports.push(HostReport { target, outcome });
        }

        let snapshot = FleetSnapshot::from_reports(reports);
        tracing::debug!(
            targets = snapshot.reports.len(),
            reachable = snapshot.reachable_count,
            unreachable = snapshot.unreachable_count,
            "Polling cycle complete"
        );
        snapshot
    }
}
