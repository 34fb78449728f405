//! Polling Cycle Integration Tests
//!
//! Exercises the public probing/aggregation API end to end with a scripted
//! prober, without touching the network. The one exception is the real
//! [`IcmpProber`] malformed-address case, which fails before any packet is
//! sent.

use std::collections::HashMap;
use std::time::Duration;

use fleetping::{
    AppConfig, FleetSnapshot, IcmpProber, ProbeOptions, ProbeOutcome, Prober, StatusAggregator,
    Target, Verdict,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// Scripted prober keyed by target address. Unscripted addresses resolve to
/// a probe error.
#[derive(Default)]
struct ScriptedProber {
    outcomes: HashMap<String, ProbeOutcome>,
    delays: HashMap<String, Duration>,
}

impl ScriptedProber {
    fn with_outcome(mut self, address: &str, outcome: ProbeOutcome) -> Self {
        self.outcomes.insert(address.to_string(), outcome);
        self
    }

    fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &Target, _opts: &ProbeOptions) -> ProbeOutcome {
        if let Some(delay) = self.delays.get(&target.address) {
            tokio::time::sleep(*delay).await;
        }
        self.outcomes
            .get(&target.address)
            .cloned()
            .unwrap_or_else(ProbeOutcome::probe_error)
    }
}

fn assert_invariants(snapshot: &FleetSnapshot, expected_targets: usize) {
    assert_eq!(snapshot.reports.len(), expected_targets);
    assert_eq!(
        snapshot.reachable_count + snapshot.unreachable_count,
        snapshot.reports.len()
    );
    assert_eq!(snapshot.alerts.len(), snapshot.unreachable_count);
}

// =============================================================================
// Scenarios
// =============================================================================

/// Router answers with ~1ms average, ONT never answers.
#[tokio::test]
async fn router_up_ont_down() {
    let prober = ScriptedProber::default()
        .with_outcome("10.0.0.1", ProbeOutcome::reachable(1.0))
        .with_outcome("10.0.0.2", ProbeOutcome::unreachable());
    let aggregator = StatusAggregator::new(prober, ProbeOptions::new(4, Duration::from_secs(2)));

    let targets = vec![
        Target::new("10.0.0.1", "Router"),
        Target::new("10.0.0.2", "ONT"),
    ];
    let snapshot = aggregator.poll_all(&targets).await;

    assert_invariants(&snapshot, 2);
    assert_eq!(snapshot.reachable_count, 1);
    assert_eq!(snapshot.unreachable_count, 1);
    assert_eq!(snapshot.mean_latency_ms, Some(1.0));

    let router = &snapshot.reports[0];
    assert_eq!(router.target.label, "Router");
    assert_eq!(router.outcome.verdict, Verdict::Reachable);
    assert_eq!(router.outcome.latency_ms, Some(1.0));

    let ont = &snapshot.reports[1];
    assert_eq!(ont.target.label, "ONT");
    assert_eq!(ont.outcome.verdict, Verdict::Unreachable);
    assert_eq!(ont.outcome.latency_ms, None);

    assert_eq!(snapshot.alerts.len(), 1);
    assert_eq!(snapshot.alerts[0].target.label, "ONT");
}

/// Report order follows the configured list even when completion order is
/// fully reversed by per-target delays.
#[tokio::test]
async fn configured_order_survives_slow_probes() {
    let addresses = ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"];
    let mut prober = ScriptedProber::default();
    for (i, address) in addresses.iter().enumerate() {
        prober = prober
            .with_outcome(address, ProbeOutcome::reachable(i as f64))
            // Earlier targets sleep longer, so they complete last
            .with_delay(address, Duration::from_millis(10 * (addresses.len() - i) as u64));
    }
    let aggregator = StatusAggregator::new(prober, ProbeOptions::default());

    let targets: Vec<Target> = addresses
        .iter()
        .enumerate()
        .map(|(i, a)| Target::unlabelled(*a, i))
        .collect();
    let snapshot = aggregator.poll_all(&targets).await;

    assert_invariants(&snapshot, addresses.len());
    let order: Vec<&str> = snapshot
        .reports
        .iter()
        .map(|r| r.target.address.as_str())
        .collect();
    assert_eq!(order, addresses);
}

/// A malformed address yields a probe error from the real ICMP prober, and
/// still appears in reports, tallies, and alerts.
#[tokio::test]
async fn malformed_address_is_probe_error_not_unreachable() {
    let aggregator = StatusAggregator::new(
        IcmpProber::new(),
        ProbeOptions::new(1, Duration::from_millis(100)),
    );

    let snapshot = aggregator.poll_all(&[Target::new("", "Broken")]).await;

    assert_invariants(&snapshot, 1);
    assert_eq!(snapshot.reports[0].outcome.verdict, Verdict::ProbeError);
    assert_eq!(snapshot.unreachable_count, 1);
    assert_eq!(snapshot.alerts.len(), 1);
}

/// A target that always times out reports unreachable on consecutive cycles
/// with no residual state from the first cycle.
#[tokio::test]
async fn timeouts_are_idempotent_across_cycles() {
    let prober = ScriptedProber::default().with_outcome("10.0.0.9", ProbeOutcome::unreachable());
    let aggregator = StatusAggregator::new(prober, ProbeOptions::default());
    let targets = vec![Target::new("10.0.0.9", "Flaky")];

    let first = aggregator.poll_all(&targets).await;
    let second = aggregator.poll_all(&targets).await;

    for snapshot in [&first, &second] {
        assert_invariants(snapshot, 1);
        assert_eq!(snapshot.reports[0].outcome.verdict, Verdict::Unreachable);
        assert_eq!(snapshot.mean_latency_ms, None);
    }
}

/// An empty configured list produces an empty, healthy snapshot.
#[tokio::test]
async fn empty_fleet_produces_empty_snapshot() {
    let aggregator = StatusAggregator::new(ScriptedProber::default(), ProbeOptions::default());

    let snapshot = aggregator.poll_all(&[]).await;

    assert_invariants(&snapshot, 0);
    assert_eq!(snapshot.mean_latency_ms, None);
    assert!(snapshot.is_healthy());
}

/// Config round trip: YAML to targets to a polled snapshot.
#[tokio::test]
async fn config_targets_drive_a_cycle() {
    let yaml = r#"
monitor:
  attempts: 2
  timeout: 250ms
targets:
  - address: 10.0.0.1
    label: Router
  - address: 10.0.0.2
"#;
    let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();

    let prober = ScriptedProber::default()
        .with_outcome("10.0.0.1", ProbeOutcome::reachable(0.8))
        .with_outcome("10.0.0.2", ProbeOutcome::reachable(1.2));
    let aggregator = StatusAggregator::new(prober, config.monitor.probe_options());

    let targets = config.to_targets();
    let snapshot = aggregator.poll_all(&targets).await;

    assert_invariants(&snapshot, 2);
    assert_eq!(snapshot.reports[1].target.label, "host-2");
    assert_eq!(snapshot.mean_latency_ms, Some(1.0));
    assert!(snapshot.is_healthy());
}
