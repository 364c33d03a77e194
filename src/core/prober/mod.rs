// src/core/prober/mod.rs

//! The probing engine. Six independent probers run concurrently against one
//! classified target; their outputs feed scoring, remediation, and the threat
//! summary. A prober never fails the analysis: whatever goes wrong becomes
//! data inside its own section of the report.

pub mod blacklist_prober;
pub mod certificate_prober;
pub mod dns_health_prober;
pub mod email_auth_prober;
pub mod hosting_prober;
pub mod hosting_recommender;
pub mod input_classifier;
pub mod port_scanner;

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::core::catalog::{self, ReputationCatalog};
use crate::core::models::{ReputationReport, Target, TargetKind};
use crate::core::{remediation, scoring, threat_intel};

/// Domain for SPF/DMARC lookups. Only a hostname the user actually supplied
/// qualifies: a PTR name found for an IP input is usually the provider's
/// generic reverse record, and probing its email posture would be misleading.
fn email_probe_domain(target: &Target) -> Option<&str> {
    match target.kind {
        TargetKind::Hostname => target.hostname(),
        TargetKind::Ipv4 => None,
    }
}

/// One engine instance holds the shared catalog; analyses themselves are
/// stateless, so a single engine can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct ReputationEngine {
    catalog: Arc<ReputationCatalog>,
}

impl Default for ReputationEngine {
    fn default() -> Self {
        Self::new(catalog::builtin())
    }
}

impl ReputationEngine {
    pub fn new(catalog: Arc<ReputationCatalog>) -> Self {
        Self { catalog }
    }

    /// Runs the full analysis for one hostname, URL, or IPv4 address.
    ///
    /// All six probers run concurrently and none can abort the others; the
    /// only cancellation anywhere is each prober's own timeout. The report is
    /// always fully constructed, whatever subset of probers had data to work
    /// with.
    pub async fn analyze(&self, input: &str) -> ReputationReport {
        let started = Instant::now();
        let target = input_classifier::classify_target(input).await;
        info!(target = %target.raw, kind = ?target.kind, "Starting reputation analysis.");

        let ip = target
            .resolved_ip
            .as_deref()
            .and_then(|s| Ipv4Addr::from_str(s).ok());
        let hostname = target.hostname().map(String::from);

        let (blacklist, email_auth, certificate, dns_health, port_scan, hosting) = tokio::join!(
            blacklist_prober::run_blacklist_probe(&self.catalog, ip),
            email_auth_prober::run_email_auth_probe(email_probe_domain(&target)),
            certificate_prober::run_certificate_probe(hostname.as_deref()),
            dns_health_prober::run_dns_health_probe(hostname.as_deref()),
            port_scanner::run_port_scan(&self.catalog, ip),
            hosting_prober::run_hosting_probe(&self.catalog, &target),
        );

        let (scores, overall_score) = scoring::aggregate(
            &self.catalog,
            &blacklist,
            &email_auth,
            &certificate,
            &dns_health,
            &port_scan,
            &hosting,
        );
        let recommendations = remediation::build_recommendations(
            &blacklist,
            &email_auth,
            &certificate,
            &dns_health,
            &port_scan,
            overall_score,
        );
        let threat_intel = threat_intel::summarize(&blacklist, &port_scan);

        let analysis_time_ms = started.elapsed().as_millis() as u64;
        info!(
            target = %target.raw,
            overall_score,
            analysis_time_ms,
            "Reputation analysis finished."
        );

        ReputationReport {
            target,
            blacklist,
            email_auth,
            certificate,
            dns_health,
            port_scan,
            hosting,
            scores,
            overall_score,
            recommendations,
            threat_intel,
            analysis_time_ms,
        }
    }
}

/// One-shot convenience wrapper over [`ReputationEngine`] with the built-in
/// catalog.
pub async fn analyze_reputation(input: &str) -> ReputationReport {
    ReputationEngine::default().analyze(input).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_is_cheap_to_clone() {
        let engine = ReputationEngine::default();
        let clone = engine.clone();
        assert!(Arc::ptr_eq(&engine.catalog, &clone.catalog));
    }

    #[test]
    fn ip_targets_never_get_an_email_probe_domain() {
        let target = Target {
            raw: "8.8.8.8".to_string(),
            kind: TargetKind::Ipv4,
            resolved_ip: Some("8.8.8.8".to_string()),
            resolved_hostname: Some("dns.google".to_string()),
        };
        // The PTR name still drives TLS and DNS probes via hostname(), but
        // email auth belongs to the domain the user asked about.
        assert_eq!(target.hostname(), Some("dns.google"));
        assert_eq!(email_probe_domain(&target), None);

        let target = Target {
            raw: "example.com".to_string(),
            kind: TargetKind::Hostname,
            resolved_ip: Some("93.184.215.14".to_string()),
            resolved_hostname: None,
        };
        assert_eq!(email_probe_domain(&target), Some("example.com"));
    }
}
