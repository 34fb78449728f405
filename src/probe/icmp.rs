//! ICMP echo prober.
//!
//! Measures ICMP echo latency to a target host.

use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};
use tokio::time::timeout;

use super::{ProbeOptions, ProbeOutcome, Prober, Target};

/// ICMP echo prober backed by `surge-ping`.
///
/// One probe pass sends `attempts` echo requests sequentially, each bounded
/// by the per-attempt timeout, and averages the round-trip times of the
/// replies that arrived. Lost attempts are excluded from the average.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpProber;

impl IcmpProber {
    /// Create a new ICMP prober.
    pub fn new() -> Self {
        Self
    }
}

/// Resolve a target address to an IP address, bounded by `limit`.
///
/// The system resolver carries its own timeout, commonly tens of seconds,
/// and a hung lookup must not stall the probe past its own budget.
async fn resolve_address(address: &str, limit: Duration) -> Result<IpAddr, std::io::Error> {
    // Try to parse as an IP address directly
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(ip);
    }

    // Otherwise, resolve the hostname using tokio's DNS lookup
    let lookup = tokio::net::lookup_host(format!("{address}:0"));
    match timeout(limit, lookup).await {
        Ok(Ok(addrs)) => addrs
            .into_iter()
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found")),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "hostname resolution timed out",
        )),
    }
}

/// Mean round-trip time over answered attempts, in milliseconds.
/// `None` when no attempt was answered.
fn mean_rtt_ms(replies: &[Duration]) -> Option<f64> {
    if replies.is_empty() {
        return None;
    }
    let total_ms: f64 = replies.iter().map(|rtt| rtt.as_secs_f64() * 1000.0).sum();
    Some(total_ms / replies.len() as f64)
}

#[async_trait::async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, target: &Target, opts: &ProbeOptions) -> ProbeOutcome {
        // Resolve the address; failure here is a local problem, not a remote one
        let ip_addr = match resolve_address(&target.address, opts.per_attempt_timeout).await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!(
                    address = %target.address,
                    label = %target.label,
                    error = %e,
                    "Failed to resolve target address"
                );
                return ProbeOutcome::probe_error();
            }
        };

        // Create ICMP client based on IP version
        let config = match ip_addr {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };

        let client = match Client::new(&config) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    address = %target.address,
                    label = %target.label,
                    error = %e,
                    "Failed to create ICMP client"
                );
                return ProbeOutcome::probe_error();
            }
        };

        let mut pinger = client.pinger(ip_addr, PingIdentifier(rand::random())).await;
        pinger.timeout(opts.per_attempt_timeout);

        let mut replies = Vec::with_capacity(opts.attempts as usize);
        for seq in 0..opts.attempts {
            // Attempts are clamped to the u16 sequence range at construction
            let attempt = pinger.ping(PingSequence(seq as u16), &[]);
            match timeout(opts.per_attempt_timeout, attempt).await {
                Ok(Ok((_, rtt))) => replies.push(rtt),
                Ok(Err(e)) => {
                    tracing::debug!(
                        address = %target.address,
                        seq,
                        error = %e,
                        "Echo attempt unanswered"
                    );
                }
                Err(_) => {
                    tracing::debug!(
                        address = %target.address,
                        seq,
                        timeout_ms = opts.per_attempt_timeout.as_millis(),
                        "Echo attempt timed out"
                    );
                }
            }
        }

        match mean_rtt_ms(&replies) {
            Some(latency_ms) => {
                tracing::debug!(
                    address = %target.address,
                    label = %target.label,
                    latency_ms,
                    replies = replies.len(),
                    attempts = opts.attempts,
                    "Target reachable"
                );
                ProbeOutcome::reachable(latency_ms)
            }
            None => {
                tracing::debug!(
                    address = %target.address,
                    label = %target.label,
                    attempts = opts.attempts,
                    "Target unreachable, no echo replies"
                );
                ProbeOutcome::unreachable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Verdict;

    #[test]
    fn test_mean_rtt_excludes_nothing_when_all_answered() {
        let replies = [Duration::from_millis(1), Duration::from_millis(3)];
        assert_eq!(mean_rtt_ms(&replies), Some(2.0));
    }

    #[test]
    fn test_mean_rtt_single_reply() {
        let replies = [Duration::from_micros(1500)];
        assert_eq!(mean_rtt_ms(&replies), Some(1.5));
    }

    #[test]
    fn test_mean_rtt_no_replies() {
        assert_eq!(mean_rtt_ms(&[]), None);
    }

    #[tokio::test]
    async fn test_resolve_address_ipv4() {
        let ip = resolve_address("127.0.0.1", Duration::from_secs(1)).await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_address_ipv6() {
        let ip = resolve_address("::1", Duration::from_secs(1)).await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_address_empty_fails() {
        assert!(resolve_address("", Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_address_is_bounded_by_limit() {
        // An IP literal short-circuits before the limit applies
        assert!(resolve_address("127.0.0.1", Duration::ZERO).await.is_ok());

        // A hostname lookup must elapse instead of blocking on the resolver
        let err = resolve_address("localhost", Duration::ZERO).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_probe_empty_address_is_probe_error() {
        let prober = IcmpProber::new();
        let target = Target::new("", "broken");
        let outcome = prober.probe(&target, &ProbeOptions::default()).await;

        assert_eq!(outcome.verdict, Verdict::ProbeError);
        assert_eq!(outcome.latency_ms, None);
    }
}
