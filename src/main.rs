//! Fleetping Binary Entry Point
//!
//! This binary runs the periodic fleet monitor: it loads the target list,
//! polls it on a fixed interval, and prints one status table per cycle.
//! Core probing and aggregation are provided by the `fleetping` library
//! crate.

use std::time::Duration;

use clap::Parser;
use fleetping::{
    config::{parse_duration, AppConfig, TargetConfig},
    monitor::{FleetSnapshot, StatusAggregator},
    probe::IcmpProber,
    render::render_snapshot,
};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fleetping - periodic network reachability monitor
#[derive(Parser, Debug)]
#[command(name = "fleetping", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "FLEETPING_CONFIG")]
    config: Option<String>,

    /// Target to monitor, as ADDRESS or ADDRESS=LABEL (repeatable; replaces
    /// the config file's target list)
    #[arg(short, long = "target", value_name = "ADDRESS[=LABEL]")]
    targets: Vec<String>,

    /// Echo attempts per probe (overrides config file)
    #[arg(long, env = "FLEETPING_ATTEMPTS")]
    attempts: Option<u32>,

    /// Per-attempt timeout, e.g. "2s" (overrides config file)
    #[arg(long, env = "FLEETPING_TIMEOUT", value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Polling interval, e.g. "5s" (overrides config file)
    #[arg(long, env = "FLEETPING_INTERVAL", value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Run a single polling cycle and exit (non-zero when any host alerts)
    #[arg(long)]
    once: bool,
}

/// Parse a CLI target argument of the form `ADDRESS` or `ADDRESS=LABEL`.
fn parse_cli_target(raw: &str) -> TargetConfig {
    match raw.split_once('=') {
        Some((address, label)) => TargetConfig::new(address.trim()).with_label(label.trim()),
        None => TargetConfig::new(raw.trim()),
    }
}

fn log_alerts(snapshot: &FleetSnapshot) {
    for report in &snapshot.alerts {
        tracing::warn!(
            address = %report.target.address,
            label = %report.target.label,
            verdict = %report.outcome.verdict,
            "Host not reachable"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fleetping=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file, if given
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(attempts) = cli.attempts {
        config.monitor.attempts = attempts;
    }
    if let Some(timeout) = cli.timeout {
        config.monitor.timeout = timeout;
    }
    if let Some(interval) = cli.interval {
        config.monitor.interval = interval;
    }
    if !cli.targets.is_empty() {
        config.targets = cli.targets.iter().map(|raw| parse_cli_target(raw)).collect();
    }
    config.validate()?;

    let targets = config.to_targets();
    if targets.is_empty() {
        return Err("no targets configured; pass --target or a config file".into());
    }

    tracing::info!(
        targets = targets.len(),
        attempts = config.monitor.attempts,
        timeout = %humantime::format_duration(config.monitor.timeout),
        interval = %humantime::format_duration(config.monitor.interval),
        "Starting fleet monitor"
    );

    let aggregator = StatusAggregator::new(IcmpProber::new(), config.monitor.probe_options());

    if cli.once {
        let snapshot = aggregator.poll_all(&targets).await;
        print!("{}", render_snapshot(&snapshot));
        log_alerts(&snapshot);
        if !snapshot.is_healthy() {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Each tick runs one full cycle; a cycle that overruns the interval
    // delays the next tick rather than stacking overlapping cycles.
    let mut ticker = tokio::time::interval(config.monitor.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Press Ctrl+C to shutdown");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = aggregator.poll_all(&targets).await;
                print!("{}", render_snapshot(&snapshot));
                log_alerts(&snapshot);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C signal");
                break;
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_target_with_label() {
        let target = parse_cli_target("192.168.1.1=Router");
        assert_eq!(target.address, "192.168.1.1");
        assert_eq!(target.label.as_deref(), Some("Router"));
    }

    #[test]
    fn test_parse_cli_target_without_label() {
        let target = parse_cli_target("8.8.8.8");
        assert_eq!(target.address, "8.8.8.8");
        assert_eq!(target.label, None);
    }

    #[test]
    fn test_parse_cli_target_trims_whitespace() {
        let target = parse_cli_target(" 10.0.0.1 = ONT ");
        assert_eq!(target.address, "10.0.0.1");
        assert_eq!(target.label.as_deref(), Some("ONT"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "fleetping",
            "--target",
            "10.0.0.1=Router",
            "--attempts",
            "2",
            "--once",
        ]);
        assert_eq!(cli.targets, vec!["10.0.0.1=Router"]);
        assert_eq!(cli.attempts, Some(2));
        assert!(cli.once);
    }
}
