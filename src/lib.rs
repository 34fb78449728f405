//! Fleetping - Network Reachability Monitor
//!
//! This crate provides the core of a periodic fleet monitor: it probes a
//! configured set of hosts via ICMP echo, classifies each host's
//! reachability and latency, and reduces the results to a point-in-time
//! fleet status with an alert set.
//!
//! # Architecture
//!
//! - **Probe**: bounded, timeout-protected reachability check of one target
//! - **Monitor**: concurrent fan-out across the fleet, full join, reduction
//!   to a [`FleetSnapshot`]
//! - **Config**: YAML target list and probing parameters
//! - **Render**: plain-text presentation of a snapshot
//!
//! # Example
//!
//! ```rust,no_run
//! use fleetping::{IcmpProber, ProbeOptions, StatusAggregator, Target};
//!
//! #[tokio::main]
//! async fn main() {
//!     let targets = vec![
//!         Target::new("192.168.1.1", "Router"),
//!         Target::new("8.8.8.8", "Google DNS"),
//!     ];
//!     let aggregator = StatusAggregator::new(IcmpProber::new(), ProbeOptions::default());
//!     let snapshot = aggregator.poll_all(&targets).await;
//!     println!("{}/{} reachable", snapshot.reachable_count, snapshot.reports.len());
//! }
//! ```

pub mod config;
pub mod monitor;
pub mod probe;
pub mod render;

pub use config::{AppConfig, ConfigError, MonitorConfig, TargetConfig};
pub use monitor::{FleetSnapshot, HostReport, StatusAggregator};
pub use probe::{IcmpProber, ProbeOptions, ProbeOutcome, Prober, Target, Verdict};
