// src/core/threat_intel.rs

//! Condenses blacklist listings and exposed services into a single threat
//! summary with one coarse risk level for dashboards.

use tracing::debug;

use crate::core::models::{
    BlacklistResult, PortScanResult, RiskLevel, RiskTier, Threat, ThreatIntel,
};

pub fn summarize(blacklist: &[BlacklistResult], ports: &PortScanResult) -> ThreatIntel {
    let mut threats = Vec::new();

    for result in blacklist.iter().filter(|r| r.listed) {
        threats.push(Threat {
            category: "blacklist-listing".to_string(),
            source: result.name.clone(),
            severity: listing_severity(&result.zone),
            details: match &result.details {
                Some(details) => format!("{} ({})", result.description, details),
                None => result.description.clone(),
            },
        });
    }

    for issue in &ports.security_issues {
        threats.push(Threat {
            category: "exposed-service".to_string(),
            source: format!("port {}", issue.port),
            severity: issue.risk,
            details: issue.description.clone(),
        });
    }

    let listing_count = blacklist.iter().filter(|r| r.listed).count() as u32;
    let open_port_count = ports.open_ports.len() as u32;
    let risk_level = classify(&threats, listing_count);

    debug!(
        threats = threats.len(),
        listing_count, open_port_count, risk_level = ?risk_level,
        "Threat summary built."
    );
    ThreatIntel {
        risk_level,
        threats,
        listing_count,
        open_port_count,
    }
}

/// Listings on the major operators weigh more: receivers actually consult
/// them, so delivery impact is immediate.
fn listing_severity(zone: &str) -> RiskTier {
    if zone.contains("spamhaus") {
        RiskTier::High
    } else {
        RiskTier::Medium
    }
}

fn classify(threats: &[Threat], listing_count: u32) -> RiskLevel {
    let critical = threats
        .iter()
        .filter(|t| t.severity == RiskTier::Critical)
        .count();
    let high = threats
        .iter()
        .filter(|t| t.severity == RiskTier::High)
        .count();

    if critical > 0 || listing_count >= 5 {
        RiskLevel::Critical
    } else if high >= 2 || listing_count >= 3 {
        RiskLevel::High
    } else if high >= 1 || listing_count >= 1 {
        RiskLevel::Medium
    } else if !threats.is_empty() {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::SecurityIssue;

    fn listing(name: &str, zone: &str) -> BlacklistResult {
        BlacklistResult {
            name: name.to_string(),
            zone: zone.to_string(),
            description: "test zone".to_string(),
            tier: 1,
            listed: true,
            error: false,
            details: None,
        }
    }

    fn exposed(port: u16, risk: RiskTier) -> PortScanResult {
        PortScanResult {
            scanned: true,
            security_issues: vec![SecurityIssue {
                port,
                service: "svc".to_string(),
                risk,
                description: format!("svc (port {}) is reachable from the public internet", port),
            }],
            ..PortScanResult::default()
        }
    }

    #[test]
    fn clean_report_is_minimal_risk() {
        let intel = summarize(&[], &PortScanResult::default());
        assert_eq!(intel.risk_level, RiskLevel::Minimal);
        assert!(intel.threats.is_empty());
        assert_eq!(intel.listing_count, 0);
    }

    #[test]
    fn spamhaus_listing_is_high_severity() {
        let intel = summarize(
            &[listing("Spamhaus ZEN", "zen.spamhaus.org")],
            &PortScanResult::default(),
        );
        assert_eq!(intel.threats[0].severity, RiskTier::High);
        // A single high-severity threat reads as medium overall risk.
        assert_eq!(intel.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn minor_listing_is_medium_severity() {
        let intel = summarize(
            &[listing("PSBL", "psbl.surriel.com")],
            &PortScanResult::default(),
        );
        assert_eq!(intel.threats[0].severity, RiskTier::Medium);
        assert_eq!(intel.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn critical_exposed_service_dominates() {
        let intel = summarize(&[], &exposed(3389, RiskTier::Critical));
        assert_eq!(intel.risk_level, RiskLevel::Critical);
        assert_eq!(intel.threats[0].category, "exposed-service");
    }

    #[test]
    fn many_listings_escalate() {
        let three: Vec<BlacklistResult> = (0..3)
            .map(|i| listing(&format!("Zone {}", i), "minor.example"))
            .collect();
        assert_eq!(
            summarize(&three, &PortScanResult::default()).risk_level,
            RiskLevel::High
        );

        let five: Vec<BlacklistResult> = (0..5)
            .map(|i| listing(&format!("Zone {}", i), "minor.example"))
            .collect();
        assert_eq!(
            summarize(&five, &PortScanResult::default()).risk_level,
            RiskLevel::Critical
        );
    }

    #[test]
    fn open_port_count_counts_all_open_ports() {
        use crate::core::models::OpenPort;
        let mut ports = PortScanResult {
            scanned: true,
            ..PortScanResult::default()
        };
        ports.open_ports = vec![
            OpenPort { port: 80, service: "HTTP".into(), risk: RiskTier::Info },
            OpenPort { port: 443, service: "HTTPS".into(), risk: RiskTier::Info },
        ];
        let intel = summarize(&[], &ports);
        assert_eq!(intel.open_port_count, 2);
        assert_eq!(intel.risk_level, RiskLevel::Minimal);
    }
}
