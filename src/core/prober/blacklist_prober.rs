// src/core/prober/blacklist_prober.rs

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::catalog::{BlacklistZone, ReputationCatalog};
use crate::core::models::BlacklistResult;

/// Builds the DNSBL query name for an IP: octets reversed, prefixed to the zone.
pub fn reverse_octets(ip: Ipv4Addr) -> String {
    let o = ip.octets();
    format!("{}.{}.{}.{}", o[3], o[2], o[1], o[0])
}

/// Probes every configured DNSBL zone concurrently and returns one result per
/// zone. The fan-out never short-circuits: a zone that times out or SERVFAILs
/// is recorded as ambiguous (`error: true`, never a listing) while the rest of
/// the zones settle normally. Without a resolved IPv4 there is nothing to
/// query and the result is empty.
pub async fn run_blacklist_probe(
    catalog: &Arc<ReputationCatalog>,
    ip: Option<Ipv4Addr>,
) -> Vec<BlacklistResult> {
    let Some(ip) = ip else {
        debug!("No resolved IPv4, skipping blacklist probe.");
        return Vec::new();
    };

    info!(ip = %ip, zones = catalog.blacklist_zones.len(), "Starting blacklist probe.");
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let reversed = reverse_octets(ip);

    let mut tasks = JoinSet::new();
    for zone in catalog.blacklist_zones {
        let resolver = resolver.clone();
        let query = format!("{}.{}", reversed, zone.zone);
        let zone = zone.clone();
        tasks.spawn(async move { probe_zone(&resolver, &zone, &query).await });
    }

    let mut results = Vec::with_capacity(catalog.blacklist_zones.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => warn!(panic = %e, "Blacklist zone task panicked."),
        }
    }
    // JoinSet yields in completion order; keep the report deterministic.
    results.sort_by(|a, b| a.name.cmp(&b.name));

    let listed = results.iter().filter(|r| r.listed).count();
    let errored = results.iter().filter(|r| r.error).count();
    info!(listed, errored, "Blacklist probe finished.");
    results
}

/// One zone lookup. A DNSBL answers with an A record when the IP is listed;
/// NXDOMAIN/no-records means clean; anything else is ambiguous.
async fn probe_zone(
    resolver: &TokioAsyncResolver,
    zone: &BlacklistZone,
    query: &str,
) -> BlacklistResult {
    let mut result = BlacklistResult {
        name: zone.name.to_string(),
        zone: zone.zone.to_string(),
        description: zone.description.to_string(),
        tier: zone.tier,
        listed: false,
        error: false,
        details: None,
    };

    match resolver.ipv4_lookup(query.to_string()).await {
        Ok(lookup) => {
            let addrs: Vec<String> = lookup.iter().map(|a| a.to_string()).collect();
            if addrs.is_empty() {
                debug!(zone = zone.zone, "Zone answered with no addresses, treating as clean.");
            } else {
                debug!(zone = zone.zone, codes = ?addrs, "IP is listed.");
                result.listed = true;
                result.details = Some(format!("listed with response {}", addrs.join(", ")));
            }
        }
        Err(e) => match e.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => {
                debug!(zone = zone.zone, "Not listed.");
            }
            _ => {
                warn!(zone = zone.zone, error = %e, "Zone lookup failed, recording as ambiguous.");
                result.error = true;
                result.details = Some(format!("lookup failed: {}", e));
            }
        },
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octets_are_reversed_for_the_query() {
        assert_eq!(reverse_octets(Ipv4Addr::new(8, 8, 4, 4)), "4.4.8.8");
        assert_eq!(reverse_octets(Ipv4Addr::new(192, 0, 2, 99)), "99.2.0.192");
    }

    #[tokio::test]
    async fn missing_ip_yields_empty_result() {
        let catalog = crate::core::catalog::builtin();
        let results = run_blacklist_probe(&catalog, None).await;
        assert!(results.is_empty());
    }
}
