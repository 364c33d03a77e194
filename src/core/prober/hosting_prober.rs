// src/core/prober/hosting_prober.rs

//! Hosting and CMS fingerprinting: fetches the homepage, matches it against
//! the CMS signature catalog, identifies the current hosting provider from
//! DNS shape, estimates the site's traffic tier from weighted heuristics, and
//! delegates to the recommender for tier-appropriate provider suggestions.

use reqwest::Client;
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;

use crate::core::catalog::ReputationCatalog;
use crate::core::models::{HostingAnalysis, Target, TrafficSignal, TrafficTier};
use crate::core::prober::hosting_recommender::{
    self, HostingFilters, TierRecommendation,
};

const HTTPS_TIMEOUT: Duration = Duration::from_secs(15);
const HTTP_FALLBACK_TIMEOUT: Duration = Duration::from_secs(8);
/// Fingerprinting only needs the document head and the first screenful.
const BODY_CAP: usize = 64 * 1024;
const USER_AGENT: &str = concat!("reputon/", env!("CARGO_PKG_VERSION"));

/// Homepage response reduced to what fingerprinting needs: lowercased headers
/// and a lowercased, capped body.
#[derive(Debug, Clone)]
pub struct HomepageSnapshot {
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub via_https: bool,
}

/// Runs the full hosting analysis. An unreachable homepage is not fatal: CMS
/// detection comes up empty but tier estimation still works from DNS shape,
/// and the recommender always produces something for the estimated tier.
pub async fn run_hosting_probe(
    catalog: &Arc<ReputationCatalog>,
    target: &Target,
) -> HostingAnalysis {
    let mut analysis = HostingAnalysis {
        all_providers: catalog.providers.iter().map(|p| p.name.to_string()).collect(),
        ..HostingAnalysis::default()
    };

    let Some(host) = target.hostname() else {
        debug!("No hostname available, skipping hosting analysis.");
        return analysis;
    };

    info!(host, "Starting hosting analysis.");
    let (snapshot, current_host, shape) = tokio::join!(
        fetch_homepage(host),
        detect_current_host(catalog, host),
        probe_dns_shape(host),
    );

    analysis.cms = snapshot.as_ref().and_then(|s| detect_cms(catalog, s));
    analysis.current_host = current_host;

    let (tier, signals, confidence) =
        estimate_traffic_tier(catalog, host, snapshot.as_ref(), &shape);
    analysis.traffic_tier = tier;
    analysis.tier_confidence = confidence;
    analysis.traffic_indicators = signals;

    let TierRecommendation {
        hosts,
        price_comparison,
        tier_warning,
    } = hosting_recommender::recommended_hosts_for_tier(
        catalog,
        analysis.cms.as_deref(),
        tier,
        &HostingFilters::default(),
    );
    analysis.recommended_hosts = hosts;
    analysis.price_comparison = price_comparison;
    analysis.tier_warning = tier_warning;
    analysis.savings_opportunities =
        hosting_recommender::savings_opportunities(catalog, analysis.current_host.as_deref(), tier);

    info!(
        host,
        cms = analysis.cms.as_deref().unwrap_or("none"),
        current_host = analysis.current_host.as_deref().unwrap_or("unknown"),
        tier = ?tier,
        "Hosting analysis finished."
    );
    analysis
}

/// Fetches `https://<host>/`, falling back to plain HTTP on any failure.
/// At most one redirect is followed and only when it stays on the same site,
/// so a parked domain bouncing to a registrar page is not fingerprinted as
/// the registrar.
pub async fn fetch_homepage(host: &str) -> Option<HomepageSnapshot> {
    if let Some(snapshot) = fetch_url(&format!("https://{}/", host), host, HTTPS_TIMEOUT, true).await
    {
        return Some(snapshot);
    }
    debug!(host, "HTTPS fetch failed, retrying over plain HTTP.");
    fetch_url(
        &format!("http://{}/", host),
        host,
        HTTP_FALLBACK_TIMEOUT,
        false,
    )
    .await
}

async fn fetch_url(
    url: &str,
    host: &str,
    budget: Duration,
    via_https: bool,
) -> Option<HomepageSnapshot> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(budget)
        .redirect(same_site_redirect(host.to_string()))
        // Certificate problems are the certificate prober's concern; the
        // fingerprint still wants the page body.
        .danger_accept_invalid_certs(true)
        .build()
        .ok()?;

    let response = match timeout(budget, client.get(url).send()).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            debug!(url, error = %e, "Homepage fetch failed.");
            return None;
        }
        Err(_) => {
            warn!(url, "Homepage fetch timed out.");
            return None;
        }
    };

    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_lowercase(),
                value.to_str().unwrap_or("").to_lowercase(),
            )
        })
        .collect();

    let body = read_capped_body(response).await;
    Some(HomepageSnapshot {
        headers,
        body,
        via_https,
    })
}

/// Streams the body up to [`BODY_CAP`] bytes; a mid-stream error keeps what
/// already arrived instead of discarding the response.
async fn read_capped_body(mut response: reqwest::Response) -> String {
    let mut raw: Vec<u8> = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                raw.extend_from_slice(&chunk);
                if raw.len() >= BODY_CAP {
                    raw.truncate(BODY_CAP);
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Body stream ended early.");
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).to_lowercase()
}

fn same_site_redirect(host: String) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > 1 {
            return attempt.stop();
        }
        let same_site = attempt
            .url()
            .host_str()
            .is_some_and(|next| hosts_match(next, &host));
        if same_site {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// `example.com` and `www.example.com` count as the same site, whatever the
/// casing.
fn hosts_match(a: &str, b: &str) -> bool {
    fn strip(h: &str) -> &str {
        h.strip_prefix("www.").unwrap_or(h)
    }
    let a = a.to_ascii_lowercase();
    let b = b.to_ascii_lowercase();
    strip(&a) == strip(&b)
}

/// Scores every CMS signature against the snapshot (10 points per body
/// marker, 15 per header marker) and returns the best nonzero match.
pub fn detect_cms(catalog: &Arc<ReputationCatalog>, snapshot: &HomepageSnapshot) -> Option<String> {
    let mut best: Option<(&'static str, u32)> = None;
    for signature in catalog.cms_signatures {
        let mut score = 0u32;
        for marker in signature.body_markers {
            if snapshot.body.contains(marker) {
                score += 10;
            }
        }
        for (header, needle) in signature.header_markers {
            let matched = snapshot
                .headers
                .iter()
                .any(|(name, value)| name == header && (needle.is_empty() || value.contains(needle)));
            if matched {
                score += 15;
            }
        }
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((signature.name, score));
        }
    }
    best.map(|(name, score)| {
        debug!(cms = name, score, "CMS fingerprint matched.");
        name.to_string()
    })
}

/// Identifies the hosting provider from DNS shape: CNAME targets of the apex
/// and www host plus the NS set, matched as substrings against the host
/// fingerprint catalog.
pub async fn detect_current_host(
    catalog: &Arc<ReputationCatalog>,
    host: &str,
) -> Option<String> {
    let root = host.strip_prefix("www.").unwrap_or(host);
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let www_name = format!("www.{}", root);
    let (apex_cname, www_cname, ns) = tokio::join!(
        resolver.lookup(root.to_string(), RecordType::CNAME),
        resolver.lookup(www_name, RecordType::CNAME),
        resolver.ns_lookup(root.to_string()),
    );

    let mut names: Vec<String> = Vec::new();
    if let Ok(lookup) = apex_cname {
        names.extend(lookup.iter().map(|r| r.to_string().to_lowercase()));
    }
    if let Ok(lookup) = www_cname {
        names.extend(lookup.iter().map(|r| r.to_string().to_lowercase()));
    }
    if let Ok(lookup) = ns {
        names.extend(lookup.iter().map(|r| r.to_string().to_lowercase()));
    }

    match_host_fingerprint(catalog, &names)
}

fn match_host_fingerprint(catalog: &Arc<ReputationCatalog>, names: &[String]) -> Option<String> {
    for fingerprint in catalog.host_fingerprints {
        let hit = fingerprint
            .patterns
            .iter()
            .any(|pattern| names.iter().any(|name| name.contains(pattern)));
        if hit {
            debug!(provider = fingerprint.provider, "Host fingerprint matched.");
            return Some(fingerprint.provider.to_string());
        }
    }
    None
}

/// DNS facts that feed tier estimation, gathered independently of the other
/// probers so this module stands alone.
#[derive(Debug, Default)]
pub struct DnsShape {
    pub a_count: usize,
    pub has_spf: bool,
    pub has_dmarc: bool,
}

pub async fn probe_dns_shape(host: &str) -> DnsShape {
    let root = host.strip_prefix("www.").unwrap_or(host);
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let dmarc_name = format!("_dmarc.{}", root);
    let (a, txt, dmarc) = tokio::join!(
        resolver.ipv4_lookup(root.to_string()),
        resolver.txt_lookup(root.to_string()),
        resolver.txt_lookup(dmarc_name),
    );

    DnsShape {
        a_count: a.map(|lookup| lookup.iter().count()).unwrap_or(0),
        has_spf: txt
            .map(|lookup| lookup.iter().any(|r| r.to_string().starts_with("v=spf1")))
            .unwrap_or(false),
        has_dmarc: dmarc
            .map(|lookup| lookup.iter().any(|r| r.to_string().starts_with("v=DMARC1")))
            .unwrap_or(false),
    }
}

/// Weighted-signal heuristic for the site's traffic tier. Each matched signal
/// contributes its weight; the highest tier profile whose `min_score` the
/// total reaches wins. Confidence grows with the number of distinct signals,
/// capped well below certainty because this is inference, not measurement.
pub fn estimate_traffic_tier(
    catalog: &Arc<ReputationCatalog>,
    host: &str,
    snapshot: Option<&HomepageSnapshot>,
    shape: &DnsShape,
) -> (TrafficTier, Vec<TrafficSignal>, u8) {
    let keywords = &catalog.tier_keywords;
    let mut signals: Vec<TrafficSignal> = Vec::new();
    let push = |signals: &mut Vec<TrafficSignal>, signal: String, weight: u32| {
        signals.push(TrafficSignal { signal, weight });
    };

    let host_lower = host.to_lowercase();
    if let Some(kw) = keywords.brand.iter().find(|kw| host_lower.contains(*kw)) {
        push(&mut signals, format!("brand keyword \"{}\" in domain", kw), 15);
    }
    if let Some(kw) = keywords.industry.iter().find(|kw| host_lower.contains(*kw)) {
        push(&mut signals, format!("industry keyword \"{}\" in domain", kw), 8);
    }
    if let Some(tld) = host_lower.rsplit('.').next() {
        if keywords.premium_tlds.iter().any(|p| *p == tld) {
            push(&mut signals, format!("premium .{} top-level domain", tld), 5);
        }
    }

    if let Some(snapshot) = snapshot {
        for header in keywords.cdn_headers {
            if snapshot.headers.iter().any(|(name, _)| name == header) {
                push(&mut signals, format!("CDN response header {}", header), 12);
            }
        }
        for header in keywords.security_headers {
            if snapshot.headers.iter().any(|(name, _)| name == header) {
                push(&mut signals, format!("security header {}", header), 8);
            }
        }
        if keywords.marketing.iter().any(|kw| snapshot.body.contains(kw)) {
            push(&mut signals, "corporate marketing language on homepage".to_string(), 6);
        }
        if keywords.analytics.iter().any(|kw| snapshot.body.contains(kw)) {
            push(&mut signals, "analytics tooling embedded".to_string(), 10);
        }
        if keywords.commerce.iter().any(|kw| snapshot.body.contains(kw)) {
            push(&mut signals, "commerce flows on homepage".to_string(), 8);
        }
    }

    if shape.a_count > 1 {
        push(&mut signals, "multiple apex A records (load-balanced)".to_string(), 10);
    }
    if shape.has_spf {
        push(&mut signals, "SPF configured".to_string(), 5);
    }
    if shape.has_dmarc {
        push(&mut signals, "DMARC configured".to_string(), 5);
    }

    let total: u32 = signals.iter().map(|s| s.weight).sum();
    let tier = catalog
        .tier_profiles
        .iter()
        .filter(|p| total >= p.min_score)
        .map(|p| p.tier)
        .max()
        .unwrap_or(TrafficTier::Personal);

    let confidence = (35 + 6 * signals.len() as u32).min(95) as u8;
    debug!(total, tier = ?tier, confidence, "Traffic tier estimated.");
    (tier, signals, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog;

    fn snapshot(headers: &[(&str, &str)], body: &str) -> HomepageSnapshot {
        HomepageSnapshot {
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_lowercase(),
            via_https: true,
        }
    }

    #[test]
    fn wordpress_body_markers_win() {
        let catalog = catalog::builtin();
        let snap = snapshot(
            &[("content-type", "text/html")],
            "<link href='/wp-content/themes/x.css'><script src='/wp-includes/a.js'>",
        );
        assert_eq!(detect_cms(&catalog, &snap).as_deref(), Some("WordPress"));
    }

    #[test]
    fn header_markers_outscore_weaker_body_match() {
        let catalog = catalog::builtin();
        // One Shopify header (15) plus a body marker (10) beats a single
        // WordPress body marker (10).
        let snap = snapshot(
            &[("x-shopid", "12345")],
            "cdn.shopify.com and a stray wp-json mention",
        );
        assert_eq!(detect_cms(&catalog, &snap).as_deref(), Some("Shopify"));
    }

    #[test]
    fn unmatched_snapshot_yields_no_cms() {
        let catalog = catalog::builtin();
        let snap = snapshot(&[], "<html><body>hand-rolled site</body></html>");
        assert!(detect_cms(&catalog, &snap).is_none());
    }

    #[test]
    fn fingerprint_matches_ns_substring() {
        let catalog = catalog::builtin();
        let names = vec!["dns1.p01.nsone.net.".to_string(), "ns-cloud-a1.googledomains.com.".to_string()];
        assert_eq!(
            match_host_fingerprint(&catalog, &names).as_deref(),
            Some("Google Cloud")
        );
    }

    #[test]
    fn bare_site_estimates_personal_tier() {
        let catalog = catalog::builtin();
        let shape = DnsShape::default();
        let (tier, signals, confidence) =
            estimate_traffic_tier(&catalog, "example.net", None, &shape);
        assert_eq!(tier, TrafficTier::Personal);
        assert!(signals.is_empty());
        assert_eq!(confidence, 35);
    }

    #[test]
    fn rich_corporate_site_estimates_enterprise() {
        let catalog = catalog::builtin();
        let snap = snapshot(
            &[
                ("cf-ray", "abc"),
                ("x-cache", "HIT"),
                ("strict-transport-security", "max-age=63072000"),
                ("content-security-policy", "default-src 'self'"),
            ],
            "careers investors google-analytics add to cart",
        );
        let shape = DnsShape {
            a_count: 4,
            has_spf: true,
            has_dmarc: true,
        };
        // brand 15 + tld 5 + cdn 24 + security 16 + marketing 6 + analytics 10
        // + commerce 8 + multi-A 10 + spf 5 + dmarc 5 = 104
        let (tier, signals, confidence) =
            estimate_traffic_tier(&catalog, "globalbank.com", Some(&snap), &shape);
        assert_eq!(tier, TrafficTier::Enterprise);
        assert!(signals.iter().map(|s| s.weight).sum::<u32>() >= 100);
        assert!(confidence <= 95);
    }

    #[test]
    fn redirect_host_matching_treats_www_as_same_site() {
        assert!(hosts_match("www.example.com", "example.com"));
        assert!(hosts_match("example.com", "WWW.EXAMPLE.COM"));
        assert!(hosts_match("WwW.Example.Com", "example.com"));
        assert!(!hosts_match("evil.example.org", "example.com"));
    }

    #[tokio::test]
    async fn ip_only_target_skips_hosting_analysis() {
        let catalog = catalog::builtin();
        let target = Target {
            raw: "192.0.2.1".to_string(),
            kind: crate::core::models::TargetKind::Ipv4,
            resolved_ip: Some("192.0.2.1".to_string()),
            resolved_hostname: None,
        };
        let analysis = run_hosting_probe(&catalog, &target).await;
        assert!(analysis.cms.is_none());
        assert_eq!(analysis.traffic_tier, TrafficTier::Personal);
        assert!(!analysis.all_providers.is_empty());
    }
}
