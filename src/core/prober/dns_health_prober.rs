// src/core/prober/dns_health_prober.rs

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::RecordType;
use tracing::{debug, info, warn};

use crate::core::models::DnsHealth;

/// Collects the domain's DNS redundancy and consistency posture: NS count, MX
/// presence, CAA presence, apex vs. www A records, and an advisory DNSSEC
/// check. Every sub-lookup failure is caught locally and appended to
/// `issues`; the prober always returns a populated object, marked
/// `checked: false` when no hostname was available to query.
pub async fn run_dns_health_probe(hostname: Option<&str>) -> DnsHealth {
    let Some(domain) = hostname else {
        debug!("No hostname available, skipping DNS-health probe.");
        return DnsHealth::default();
    };
    let root = domain.strip_prefix("www.").unwrap_or(domain);

    info!(domain = %root, "Starting DNS-health probe.");
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let mut health = DnsHealth {
        checked: true,
        ..DnsHealth::default()
    };

    let www_name = format!("www.{}", root);
    let (ns, mx, caa, apex_a, www_a, dnskey) = tokio::join!(
        resolver.ns_lookup(root.to_string()),
        resolver.mx_lookup(root.to_string()),
        resolver.lookup(root.to_string(), RecordType::CAA),
        resolver.ipv4_lookup(root.to_string()),
        resolver.ipv4_lookup(www_name),
        resolver.lookup(root.to_string(), RecordType::DNSKEY),
    );

    match ns {
        Ok(lookup) => {
            health.ns_records = lookup
                .iter()
                .map(|ns| ns.to_string().trim_end_matches('.').to_string())
                .collect();
            if health.ns_records.len() < 2 {
                health
                    .issues
                    .push("Fewer than two authoritative name servers".to_string());
            }
        }
        Err(e) => {
            warn!(domain = %root, error = %e, "NS lookup failed.");
            health.issues.push(format!("NS lookup failed: {}", e));
        }
    }

    match mx {
        Ok(lookup) => {
            health.mx_records = lookup
                .iter()
                .map(|mx| mx.exchange().to_string().trim_end_matches('.').to_string())
                .collect();
        }
        // A domain that does not receive mail legitimately has no MX records.
        Err(e) => match e.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => {
                debug!(domain = %root, "No MX records (not an issue).");
            }
            _ => {
                warn!(domain = %root, error = %e, "MX lookup failed.");
                health.issues.push(format!("MX lookup failed: {}", e));
            }
        },
    }

    match caa {
        Ok(lookup) => {
            health.caa_records = lookup.iter().map(|r| r.to_string()).collect();
            health.has_caa = !health.caa_records.is_empty();
        }
        Err(e) => match e.kind() {
            // CAA absence is informational only, not an issue.
            ResolveErrorKind::NoRecordsFound { .. } => {
                debug!(domain = %root, "No CAA records.");
            }
            _ => {
                warn!(domain = %root, error = %e, "CAA lookup failed.");
                health.issues.push(format!("CAA lookup failed: {}", e));
            }
        },
    }

    match apex_a {
        Ok(lookup) => {
            health.a_records = lookup.iter().map(|a| a.to_string()).collect();
        }
        Err(e) => {
            debug!(domain = %root, error = %e, "Apex A lookup failed.");
            health.issues.push("Apex has no resolvable A records".to_string());
        }
    }

    match www_a {
        Ok(lookup) => {
            health.www_records = lookup.iter().map(|a| a.to_string()).collect();
        }
        Err(e) => {
            // Plenty of domains simply don't publish a www host.
            debug!(domain = %root, error = %e, "www A lookup failed.");
        }
    }

    if !health.a_records.is_empty()
        && !health.www_records.is_empty()
        && !health
            .www_records
            .iter()
            .any(|ip| health.a_records.contains(ip))
    {
        health
            .issues
            .push("www and apex resolve to disjoint IP sets".to_string());
    }

    // Advisory only: DNSKEY presence hints at DNSSEC but a plain resolver
    // cannot validate the chain, so an error stays "unknown" and nothing
    // downstream scores this field.
    health.dnssec = match dnskey {
        Ok(lookup) => Some(lookup.iter().next().is_some()),
        Err(e) => match e.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => Some(false),
            _ => None,
        },
    };

    info!(
        domain = %root,
        ns = health.ns_records.len(),
        issues = health.issues.len(),
        "DNS-health probe finished."
    );
    health
}
