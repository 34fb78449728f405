//! Plain-text rendering of fleet snapshots.
//!
//! Thin presentation layer over [`FleetSnapshot`]: a fixed-width status
//! table, a one-line fleet summary, and an alert footer. A probe error is
//! rendered distinctly from an unreachable host so operators can tell "host
//! is down" apart from "monitor itself is misconfigured".

use std::fmt::Write;

use crate::monitor::FleetSnapshot;
use crate::probe::Verdict;

fn verdict_cell(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Reachable => "reachable",
        Verdict::Unreachable => "UNREACHABLE",
        Verdict::ProbeError => "PROBE ERROR",
    }
}

fn latency_cell(latency_ms: Option<f64>) -> String {
    match latency_ms {
        Some(ms) => format!("{ms:.2} ms"),
        None => "n/a".to_string(),
    }
}

/// Render a snapshot as a plain-text table with summary and alert footer.
pub fn render_snapshot(snapshot: &FleetSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<18} {:<16} {:<12} {:>12}  {}",
        "ADDRESS", "LABEL", "VERDICT", "LATENCY", "OBSERVED"
    );
    for report in &snapshot.reports {
        let _ = writeln!(
            out,
            "{:<18} {:<16} {:<12} {:>12}  {}",
            report.target.address,
            report.target.label,
            verdict_cell(report.outcome.verdict),
            latency_cell(report.outcome.latency_ms),
            report.outcome.observed_at.format("%H:%M:%S"),
        );
    }

    let _ = writeln!(
        out,
        "{} reachable, {} not reachable, mean latency {}",
        snapshot.reachable_count,
        snapshot.unreachable_count,
        latency_cell(snapshot.mean_latency_ms),
    );

    if !snapshot.alerts.is_empty() {
        let names: Vec<String> = snapshot
            .alerts
            .iter()
            .map(|report| {
                format!(
                    "{} ({}): {}",
                    report.target.label,
                    report.target.address,
                    verdict_cell(report.outcome.verdict)
                )
            })
            .collect();
        let _ = writeln!(out, "ALERT: {}", names.join(", "));
    }

    out
}
