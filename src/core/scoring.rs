// src/core/scoring.rs

//! Category scoring and overall aggregation. Every function here is a pure
//! mapping from prober output to a 0-100 score; probers that could not run
//! contribute a neutral 50 so missing data never reads as either safe or
//! compromised.

use std::sync::Arc;
use tracing::debug;

use crate::core::catalog::ReputationCatalog;
use crate::core::models::{
    BlacklistResult, CategoryScore, CategoryScores, CertificateInfo, DnsHealth, EmailAuthConfig,
    HostingAnalysis, PortScanResult, RiskTier, ScoreStatus,
};

/// Score when a category has no data to judge.
const NEUTRAL_SCORE: u8 = 50;

/// Flat penalties by listing count: at least N listings costs P points.
/// Checked in order, first match wins.
const LISTING_PENALTIES: &[(usize, u32)] = &[(4, 60), (2, 40), (1, 20)];

/// Deduction per open port by risk tier. Info-tier ports (web, DNS) are free.
const OPEN_PORT_PENALTIES: &[(RiskTier, u32)] = &[
    (RiskTier::Critical, 25),
    (RiskTier::High, 15),
    (RiskTier::Medium, 5),
];

/// Category weights for the overall score. The hosting weight applies to a
/// coarse baseline, not a full category; hosting quality is advisory.
const W_BLACKLIST: f64 = 0.40;
const W_EMAIL: f64 = 0.20;
const W_CERTIFICATE: f64 = 0.15;
const W_DNS: f64 = 0.10;
const W_PORTS: f64 = 0.10;
const W_HOSTING: f64 = 0.05;

/// Computes every category score and the weighted overall score.
pub fn aggregate(
    catalog: &Arc<ReputationCatalog>,
    blacklist: &[BlacklistResult],
    email: &EmailAuthConfig,
    certificate: &CertificateInfo,
    dns: &DnsHealth,
    ports: &PortScanResult,
    hosting: &HostingAnalysis,
) -> (CategoryScores, u8) {
    let scores = CategoryScores {
        blacklist: categorize(blacklist_score(blacklist)),
        email: categorize(email_score(email)),
        certificate: categorize(certificate_score(certificate)),
        dns_health: categorize(dns_score(dns)),
        port_security: categorize(port_score(ports)),
    };

    let overall = (f64::from(scores.blacklist.score) * W_BLACKLIST
        + f64::from(scores.email.score) * W_EMAIL
        + f64::from(scores.certificate.score) * W_CERTIFICATE
        + f64::from(scores.dns_health.score) * W_DNS
        + f64::from(scores.port_security.score) * W_PORTS
        + f64::from(hosting_baseline(catalog, hosting)) * W_HOSTING)
        .round() as u8;

    debug!(
        blacklist = scores.blacklist.score,
        email = scores.email.score,
        certificate = scores.certificate.score,
        dns = scores.dns_health.score,
        ports = scores.port_security.score,
        overall,
        "Scores aggregated."
    );
    (scores, overall.min(100))
}

fn categorize(score: u8) -> CategoryScore {
    CategoryScore {
        score,
        status: status_for(score),
    }
}

pub fn status_for(score: u8) -> ScoreStatus {
    match score {
        90..=100 => ScoreStatus::Excellent,
        70..=89 => ScoreStatus::Good,
        50..=69 => ScoreStatus::Fair,
        30..=49 => ScoreStatus::Poor,
        _ => ScoreStatus::Critical,
    }
}

/// A fully clean result is a perfect 100. Any listing drops the score to the
/// clean percentage of conclusive zones minus a flat penalty by listing
/// count. Zones that errored are excluded from the percentage entirely, and
/// an empty result set (IP never resolved) is neutral.
pub fn blacklist_score(results: &[BlacklistResult]) -> u8 {
    if results.is_empty() {
        return NEUTRAL_SCORE;
    }

    let conclusive: Vec<&BlacklistResult> = results.iter().filter(|r| !r.error).collect();
    if conclusive.is_empty() {
        return NEUTRAL_SCORE;
    }

    let listed = conclusive.iter().filter(|r| r.listed).count();
    if listed == 0 {
        return 100;
    }

    let clean_pct = ((conclusive.len() - listed) as f64 / conclusive.len() as f64) * 100.0;
    let penalty = LISTING_PENALTIES
        .iter()
        .find(|(at_least, _)| listed >= *at_least)
        .map(|(_, p)| *p)
        .unwrap_or(0);
    (clean_pct as u32).saturating_sub(penalty).min(100) as u8
}

/// SPF and DMARC are worth 40 points each; an enforcing DMARC policy adds a
/// bonus (reject 10, quarantine 5). DKIM cannot be verified generically so it
/// contributes a flat 10 regardless. A probe that never ran is neutral.
pub fn email_score(email: &EmailAuthConfig) -> u8 {
    if !email.checked {
        return NEUTRAL_SCORE;
    }
    let config = email;

    let mut score: u32 = 10; // DKIM informational allowance
    if config.spf.valid {
        score += 40;
    }
    if config.dmarc.valid {
        score += 40;
        match config.dmarc.policy.as_deref() {
            Some("reject") => score += 10,
            Some("quarantine") => score += 5,
            _ => {}
        }
    }
    score.min(100) as u8
}

/// An absent certificate (unreachable, unparseable) scores zero outright. An
/// inspected one starts at 50, earns an expiry-headroom bonus (or a 50-point
/// deduction when it is outside its validity window), loses points for
/// self-signing, and earns protocol and AEAD-cipher bonuses, clamped to 0-100.
pub fn certificate_score(cert: &CertificateInfo) -> u8 {
    if !cert.valid {
        return 0;
    }

    let mut score: i32 = 50;
    score += if cert.is_expired || cert.is_not_yet_valid {
        -50
    } else {
        match cert.days_until_expiry {
            Some(days) if days > 90 => 25,
            Some(days) if days > 30 => 15,
            _ => 5,
        }
    };
    if cert.self_signed {
        score -= 20;
    }
    match cert.protocol.as_deref() {
        Some("TLSv1.3") => score += 15,
        Some("TLSv1.2") => score += 10,
        _ => {}
    }
    if cert
        .cipher
        .as_deref()
        .is_some_and(|c| c.contains("GCM") || c.contains("CHACHA20") || c.contains("POLY1305"))
    {
        score += 10;
    }
    score.clamp(0, 100) as u8
}

/// DNS health floats around a 70-point baseline: name-server redundancy
/// swings 10 points either way, a CAA record adds 10, working mail routing
/// adds 5, and every recorded issue subtracts 5. A probe that never ran is
/// neutral.
pub fn dns_score(dns: &DnsHealth) -> u8 {
    if !dns.checked {
        return NEUTRAL_SCORE;
    }
    let health = dns;

    let mut score: i32 = 70;
    score += if health.ns_records.len() >= 2 { 10 } else { -10 };
    if health.has_caa {
        score += 10;
    }
    if !health.mx_records.is_empty() {
        score += 5;
    }
    score -= 5 * health.issues.len() as i32;
    score.clamp(0, 100) as u8
}

/// Starts at 100 and deducts per open port by risk tier. A skipped scan is
/// neutral, not perfect: an unreachable host earns no port-security credit.
pub fn port_score(ports: &PortScanResult) -> u8 {
    if !ports.scanned {
        return NEUTRAL_SCORE;
    }

    let mut score: u32 = 100;
    for open in &ports.open_ports {
        let penalty = OPEN_PORT_PENALTIES
            .iter()
            .find(|(tier, _)| *tier == open.risk)
            .map(|(_, p)| *p)
            .unwrap_or(0);
        score = score.saturating_sub(penalty);
    }
    score as u8
}

/// Coarse hosting baseline: being on recognized cloud infrastructure is worth
/// slightly more than any other (or unknown) arrangement. Hosting is advice,
/// not posture, so this never swings the overall score by more than a point.
fn hosting_baseline(catalog: &Arc<ReputationCatalog>, hosting: &HostingAnalysis) -> u8 {
    let on_cloud = hosting.current_host.as_deref().is_some_and(|host| {
        catalog
            .host_fingerprints
            .iter()
            .any(|fp| fp.provider == host && fp.is_cloud)
    });
    if on_cloud { 70 } else { 60 }
}
