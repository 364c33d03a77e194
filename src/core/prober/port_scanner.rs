// src/core/prober/port_scanner.rs

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::core::catalog::{ReputationCatalog, SensitivePort};
use crate::core::models::{OpenPort, PortScanResult, RiskTier, SecurityIssue};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeOutcome {
    Open,
    Closed,
    /// No response within the timeout. Indistinguishable from a firewall
    /// silently dropping the SYN; scored identically to closed.
    Filtered,
}

/// Probes every catalogued sensitive port concurrently with a raw TCP
/// connect. All ports are launched at once, so total wall time is bounded by
/// the slowest single 2s timeout rather than their sum. Open ports at
/// critical/high risk become security issues; medium/info are recorded only.
/// Without a resolved IPv4 the scan is skipped (`scanned: false`).
pub async fn run_port_scan(
    catalog: &Arc<ReputationCatalog>,
    ip: Option<Ipv4Addr>,
) -> PortScanResult {
    let Some(ip) = ip else {
        debug!("No resolved IPv4, skipping port scan.");
        return PortScanResult::default();
    };

    info!(ip = %ip, ports = catalog.sensitive_ports.len(), "Starting port scan.");
    let (tx, mut rx) = mpsc::channel(catalog.sensitive_ports.len());
    for entry in catalog.sensitive_ports {
        let tx = tx.clone();
        let entry = entry.clone();
        tokio::spawn(async move {
            let outcome = probe_port(ip, entry.port).await;
            let _ = tx.send((entry, outcome)).await;
        });
    }
    drop(tx);

    let mut result = PortScanResult {
        scanned: true,
        ..PortScanResult::default()
    };
    while let Some((entry, outcome)) = rx.recv().await {
        record_outcome(&mut result, &entry, outcome);
    }

    result.open_ports.sort_by_key(|p| p.port);
    result.closed_ports.sort_unstable();
    result.timed_out_ports.sort_unstable();
    result.security_issues.sort_by_key(|i| i.port);

    info!(
        open = result.open_ports.len(),
        issues = result.security_issues.len(),
        "Port scan finished."
    );
    result
}

async fn probe_port(ip: Ipv4Addr, port: u16) -> ProbeOutcome {
    let addr = SocketAddr::from((ip, port));
    match timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => ProbeOutcome::Open,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => ProbeOutcome::Closed,
        Ok(Err(_)) => ProbeOutcome::Filtered,
        Err(_) => ProbeOutcome::Filtered,
    }
}

fn record_outcome(result: &mut PortScanResult, entry: &SensitivePort, outcome: ProbeOutcome) {
    match outcome {
        ProbeOutcome::Open => {
            debug!(port = entry.port, service = entry.service, "Port open.");
            result.open_ports.push(OpenPort {
                port: entry.port,
                service: entry.service.to_string(),
                risk: entry.risk,
            });
            if matches!(entry.risk, RiskTier::Critical | RiskTier::High) {
                result.security_issues.push(SecurityIssue {
                    port: entry.port,
                    service: entry.service.to_string(),
                    risk: entry.risk,
                    description: format!(
                        "{} (port {}) is reachable from the public internet",
                        entry.service, entry.port
                    ),
                });
            }
        }
        ProbeOutcome::Closed => result.closed_ports.push(entry.port),
        ProbeOutcome::Filtered => result.timed_out_ports.push(entry.port),
    }
}
