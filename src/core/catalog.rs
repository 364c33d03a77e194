// src/core/catalog.rs

//! Static, read-only configuration data consulted by the probers and the
//! recommendation engine: DNSBL zones, the sensitive-port table, CMS and
//! hosting-provider signatures, the provider catalog, and the keyword lists
//! behind the traffic-tier heuristic. Everything here is data, not code, so
//! the scanner's intelligence can be updated without touching probe logic.
//!
//! The engine receives the catalog as an immutable object at construction,
//! which lets tests swap in fixtures; `builtin()` is the production set.

use crate::core::models::{RiskTier, TrafficTier};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// One DNS-based blacklist. Tier 1 zones are the widely-mirrored major lists,
/// tier 2 are reputable aggregate lists, tier 3 are specialist or aggressive
/// lists whose hits matter less on their own.
#[derive(Debug, Clone)]
pub struct BlacklistZone {
    pub name: &'static str,
    pub zone: &'static str,
    pub description: &'static str,
    pub tier: u8,
}

/// A port worth probing, with the risk of finding it open on a public web host.
#[derive(Debug, Clone)]
pub struct SensitivePort {
    pub port: u16,
    pub service: &'static str,
    pub risk: RiskTier,
}

/// Substring evidence for one CMS. Body markers are worth 10 points each,
/// header markers 15; the highest-scoring signature wins.
#[derive(Debug, Clone)]
pub struct CmsSignature {
    pub name: &'static str,
    pub body_markers: &'static [&'static str],
    /// (header name, substring to find in its value), both matched lowercase.
    pub header_markers: &'static [(&'static str, &'static str)],
}

/// Maps CNAME/NS substrings to a hosting provider name.
#[derive(Debug, Clone)]
pub struct HostFingerprint {
    pub provider: &'static str,
    pub patterns: &'static [&'static str],
    /// Whether this is infrastructure-grade cloud hosting (feeds the basic
    /// hosting sub-score).
    pub is_cloud: bool,
}

#[derive(Debug, Clone)]
pub struct HostingPlan {
    pub name: &'static str,
    pub price: f64,
    pub storage_gb: u32,
}

/// A hosting provider in the recommendation catalog.
#[derive(Debug, Clone)]
pub struct HostingProvider {
    pub name: &'static str,
    pub categories: &'static [&'static str],
    pub regions: &'static [&'static str],
    pub rating: f64,
    pub cms_affinity: &'static [&'static str],
    /// 0 = none, 1 = basic store support, 2 = advanced, 3 = dedicated platform.
    pub ecommerce_level: u8,
    pub features: &'static [&'static str],
    pub plans: &'static [HostingPlan],
}

/// Per-tier recommendation constraints: the heuristic score needed to reach
/// the tier, the minimum acceptable monthly spend, and which hosting
/// categories are appropriate at that scale.
#[derive(Debug, Clone)]
pub struct TierProfile {
    pub tier: TrafficTier,
    pub min_score: u32,
    pub min_monthly: f64,
    pub categories: &'static [&'static str],
}

/// Keyword lists feeding the additive traffic-tier scorer.
#[derive(Debug, Clone)]
pub struct TierKeywords {
    pub brand: &'static [&'static str],
    pub industry: &'static [&'static str],
    pub premium_tlds: &'static [&'static str],
    pub marketing: &'static [&'static str],
    pub analytics: &'static [&'static str],
    pub commerce: &'static [&'static str],
    pub cdn_headers: &'static [&'static str],
    pub security_headers: &'static [&'static str],
}

/// The complete immutable configuration for one engine instance. Loaded once,
/// shared across concurrent analyses, never mutated.
#[derive(Debug, Clone)]
pub struct ReputationCatalog {
    pub version: &'static str,
    pub blacklist_zones: &'static [BlacklistZone],
    pub sensitive_ports: &'static [SensitivePort],
    pub cms_signatures: &'static [CmsSignature],
    pub host_fingerprints: &'static [HostFingerprint],
    pub providers: &'static [HostingProvider],
    pub tier_profiles: &'static [TierProfile],
    pub tier_keywords: TierKeywords,
}

impl ReputationCatalog {
    pub fn tier_profile(&self, tier: TrafficTier) -> &TierProfile {
        // Every catalog must define all four tiers; a missing one is a
        // configuration bug, not an environmental condition.
        self.tier_profiles
            .iter()
            .find(|p| p.tier == tier)
            .expect("catalog defines a profile for every traffic tier")
    }

    pub fn port_entry(&self, port: u16) -> Option<&SensitivePort> {
        self.sensitive_ports.iter().find(|p| p.port == port)
    }

    pub fn provider(&self, name: &str) -> Option<&HostingProvider> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

static BLACKLIST_ZONES: &[BlacklistZone] = &[
    BlacklistZone { name: "Spamhaus ZEN", zone: "zen.spamhaus.org", description: "Combined Spamhaus SBL/XBL/PBL list", tier: 1 },
    BlacklistZone { name: "SpamCop", zone: "bl.spamcop.net", description: "SpamCop reported spam sources", tier: 1 },
    BlacklistZone { name: "Barracuda", zone: "b.barracudacentral.org", description: "Barracuda Reputation Block List", tier: 1 },
    BlacklistZone { name: "CBL", zone: "cbl.abuseat.org", description: "Composite Blocking List (botnet/proxy exits)", tier: 1 },
    BlacklistZone { name: "SORBS", zone: "dnsbl.sorbs.net", description: "SORBS aggregate zone", tier: 2 },
    BlacklistZone { name: "SORBS Spam", zone: "spam.dnsbl.sorbs.net", description: "SORBS verified spam sources", tier: 2 },
    BlacklistZone { name: "SORBS Web", zone: "web.dnsbl.sorbs.net", description: "SORBS exploitable web servers", tier: 3 },
    BlacklistZone { name: "SORBS DUL", zone: "dul.dnsbl.sorbs.net", description: "SORBS dynamic user address space", tier: 3 },
    BlacklistZone { name: "SORBS Zombie", zone: "zombie.dnsbl.sorbs.net", description: "SORBS hijacked networks", tier: 3 },
    BlacklistZone { name: "PSBL", zone: "psbl.surriel.com", description: "Passive Spam Block List", tier: 2 },
    BlacklistZone { name: "UCEPROTECT L1", zone: "dnsbl-1.uceprotect.net", description: "UCEPROTECT single-IP policy list", tier: 2 },
    BlacklistZone { name: "UCEPROTECT L2", zone: "dnsbl-2.uceprotect.net", description: "UCEPROTECT allocation-level list", tier: 3 },
    BlacklistZone { name: "UCEPROTECT L3", zone: "dnsbl-3.uceprotect.net", description: "UCEPROTECT ASN-level list", tier: 3 },
    BlacklistZone { name: "WPBL", zone: "db.wpbl.info", description: "Weighted Private Block List", tier: 3 },
    BlacklistZone { name: "Manitu", zone: "ix.dnsbl.manitu.net", description: "Heise/Manitu NiX Spam list", tier: 2 },
    BlacklistZone { name: "SpamRats Dyna", zone: "dyna.spamrats.com", description: "SpamRats dynamic address list", tier: 3 },
    BlacklistZone { name: "SpamRats NoPtr", zone: "noptr.spamrats.com", description: "SpamRats hosts without PTR", tier: 3 },
    BlacklistZone { name: "SpamRats Spam", zone: "spam.spamrats.com", description: "SpamRats detected spam sources", tier: 2 },
    BlacklistZone { name: "Blocklist.de", zone: "bl.blocklist.de", description: "Attack sources reported by fail2ban users", tier: 2 },
    BlacklistZone { name: "s5h", zone: "all.s5h.net", description: "s5h.net combined abuse list", tier: 3 },
    BlacklistZone { name: "GBUdb Truncate", zone: "truncate.gbudb.net", description: "GBUdb extremely-bad-reputation IPs", tier: 3 },
    BlacklistZone { name: "Interserver", zone: "rbl.interserver.net", description: "Interserver RBL", tier: 3 },
    BlacklistZone { name: "Backscatterer", zone: "ips.backscatterer.org", description: "Misdirected bounce (backscatter) senders", tier: 3 },
    BlacklistZone { name: "DroneBL", zone: "dnsbl.dronebl.org", description: "Compromised hosts and drones", tier: 2 },
    BlacklistZone { name: "Mailspike", zone: "bl.mailspike.net", description: "Mailspike reputation blacklist", tier: 2 },
];

static SENSITIVE_PORTS: &[SensitivePort] = &[
    SensitivePort { port: 21, service: "FTP", risk: RiskTier::High },
    SensitivePort { port: 22, service: "SSH", risk: RiskTier::Medium },
    SensitivePort { port: 23, service: "Telnet", risk: RiskTier::Critical },
    SensitivePort { port: 25, service: "SMTP", risk: RiskTier::Medium },
    SensitivePort { port: 53, service: "DNS", risk: RiskTier::Info },
    SensitivePort { port: 80, service: "HTTP", risk: RiskTier::Info },
    SensitivePort { port: 110, service: "POP3", risk: RiskTier::Medium },
    SensitivePort { port: 135, service: "MS RPC", risk: RiskTier::High },
    SensitivePort { port: 139, service: "NetBIOS", risk: RiskTier::High },
    SensitivePort { port: 143, service: "IMAP", risk: RiskTier::Medium },
    SensitivePort { port: 443, service: "HTTPS", risk: RiskTier::Info },
    SensitivePort { port: 445, service: "SMB", risk: RiskTier::Critical },
    SensitivePort { port: 1433, service: "MS SQL", risk: RiskTier::Critical },
    SensitivePort { port: 3306, service: "MySQL", risk: RiskTier::High },
    SensitivePort { port: 3389, service: "RDP", risk: RiskTier::Critical },
    SensitivePort { port: 5432, service: "PostgreSQL", risk: RiskTier::High },
    SensitivePort { port: 5900, service: "VNC", risk: RiskTier::High },
    SensitivePort { port: 6379, service: "Redis", risk: RiskTier::Critical },
    SensitivePort { port: 8080, service: "HTTP proxy", risk: RiskTier::Medium },
    SensitivePort { port: 27017, service: "MongoDB", risk: RiskTier::Critical },
];

static CMS_SIGNATURES: &[CmsSignature] = &[
    CmsSignature {
        name: "WordPress",
        body_markers: &["/wp-content/", "/wp-includes/", "wp-json"],
        header_markers: &[("link", "wp-json")],
    },
    CmsSignature {
        name: "Shopify",
        body_markers: &["cdn.shopify.com", "shopify.theme"],
        header_markers: &[("x-shopid", ""), ("x-sorting-hat-shopid", "")],
    },
    CmsSignature {
        name: "Wix",
        body_markers: &["wix.com", "wixstatic.com"],
        header_markers: &[("server", "pepyaka"), ("x-wix-request-id", "")],
    },
    CmsSignature {
        name: "Squarespace",
        body_markers: &["squarespace.com", "static1.squarespace.com"],
        header_markers: &[("server", "squarespace")],
    },
    CmsSignature {
        name: "Joomla",
        body_markers: &["/media/jui/", "joomla!", "com_content"],
        header_markers: &[],
    },
    CmsSignature {
        name: "Drupal",
        body_markers: &["/sites/default/files", "drupal.settings", "/core/misc/drupal.js"],
        header_markers: &[("x-drupal-cache", ""), ("x-generator", "drupal")],
    },
    CmsSignature {
        name: "Magento",
        body_markers: &["/static/version", "mage/cookies", "magento"],
        header_markers: &[("x-magento-cache-debug", "")],
    },
    CmsSignature {
        name: "Ghost",
        body_markers: &["ghost.io", "content=\"ghost"],
        header_markers: &[("x-ghost-cache-status", "")],
    },
    CmsSignature {
        name: "Webflow",
        body_markers: &["assets.website-files.com", "data-wf-site"],
        header_markers: &[],
    },
];

static HOST_FINGERPRINTS: &[HostFingerprint] = &[
    HostFingerprint { provider: "Cloudflare", patterns: &["cloudflare"], is_cloud: true },
    HostFingerprint { provider: "Amazon Web Services", patterns: &["awsdns", "amazonaws", "cloudfront"], is_cloud: true },
    HostFingerprint { provider: "Google Cloud", patterns: &["googledomains", "googlehosted", "ghs.google"], is_cloud: true },
    HostFingerprint { provider: "Microsoft Azure", patterns: &["azure-dns", "azurewebsites", "trafficmanager"], is_cloud: true },
    HostFingerprint { provider: "DigitalOcean", patterns: &["digitalocean"], is_cloud: true },
    HostFingerprint { provider: "Hetzner", patterns: &["hetzner", "your-server.de"], is_cloud: true },
    HostFingerprint { provider: "OVHcloud", patterns: &["ovh.net", "ovh.ca"], is_cloud: true },
    HostFingerprint { provider: "Shopify", patterns: &["myshopify.com", "shops.myshopify"], is_cloud: false },
    HostFingerprint { provider: "Netlify", patterns: &["netlify"], is_cloud: false },
    HostFingerprint { provider: "Vercel", patterns: &["vercel-dns", "vercel.app"], is_cloud: false },
    HostFingerprint { provider: "GitHub Pages", patterns: &["github.io", "github.map.fastly"], is_cloud: false },
    HostFingerprint { provider: "WP Engine", patterns: &["wpengine"], is_cloud: false },
    HostFingerprint { provider: "Kinsta", patterns: &["kinsta"], is_cloud: false },
    HostFingerprint { provider: "Squarespace", patterns: &["squarespace"], is_cloud: false },
    HostFingerprint { provider: "Wix", patterns: &["wixdns", "wixsite"], is_cloud: false },
    HostFingerprint { provider: "SiteGround", patterns: &["siteground", "sgvps.net"], is_cloud: false },
    HostFingerprint { provider: "Bluehost", patterns: &["bluehost", "hostmonster"], is_cloud: false },
    HostFingerprint { provider: "GoDaddy", patterns: &["godaddy", "domaincontrol.com", "secureserver"], is_cloud: false },
    HostFingerprint { provider: "HostGator", patterns: &["hostgator", "websitewelcome"], is_cloud: false },
    HostFingerprint { provider: "Linode", patterns: &["linode"], is_cloud: true },
];

static PROVIDERS: &[HostingProvider] = &[
    HostingProvider {
        name: "Bluehost",
        categories: &["shared", "budget", "managed-wordpress"],
        regions: &["us", "global"],
        rating: 3.9,
        cms_affinity: &["WordPress"],
        ecommerce_level: 1,
        features: &["free-ssl", "cpanel", "email", "one-click-install", "backups"],
        plans: &[
            HostingPlan { name: "Basic", price: 2.95, storage_gb: 10 },
            HostingPlan { name: "Plus", price: 5.45, storage_gb: 20 },
            HostingPlan { name: "Pro", price: 13.95, storage_gb: 100 },
        ],
    },
    HostingProvider {
        name: "GoDaddy",
        categories: &["shared", "budget"],
        regions: &["us", "global"],
        rating: 3.5,
        cms_affinity: &["WordPress"],
        ecommerce_level: 1,
        features: &["email", "cpanel", "one-click-install"],
        plans: &[
            HostingPlan { name: "Economy", price: 5.99, storage_gb: 25 },
            HostingPlan { name: "Deluxe", price: 8.99, storage_gb: 50 },
            HostingPlan { name: "Ultimate", price: 12.99, storage_gb: 75 },
        ],
    },
    HostingProvider {
        name: "SiteGround",
        categories: &["shared", "managed-wordpress", "cloud"],
        regions: &["us", "eu", "asia"],
        rating: 4.6,
        cms_affinity: &["WordPress", "Joomla", "Drupal"],
        ecommerce_level: 2,
        features: &["free-ssl", "cdn", "staging", "backups", "email"],
        plans: &[
            HostingPlan { name: "StartUp", price: 14.99, storage_gb: 10 },
            HostingPlan { name: "GrowBig", price: 24.99, storage_gb: 20 },
            HostingPlan { name: "GoGeek", price: 39.99, storage_gb: 40 },
            HostingPlan { name: "Cloud Jump Start", price: 100.0, storage_gb: 40 },
        ],
    },
    HostingProvider {
        name: "Kinsta",
        categories: &["managed-wordpress", "managed"],
        regions: &["global"],
        rating: 4.7,
        cms_affinity: &["WordPress"],
        ecommerce_level: 2,
        features: &["cdn", "staging", "backups", "ddos-protection", "support-24-7"],
        plans: &[
            HostingPlan { name: "Starter", price: 35.0, storage_gb: 10 },
            HostingPlan { name: "Business 1", price: 115.0, storage_gb: 30 },
            HostingPlan { name: "Enterprise 1", price: 675.0, storage_gb: 100 },
        ],
    },
    HostingProvider {
        name: "WP Engine",
        categories: &["managed-wordpress", "managed"],
        regions: &["us", "eu", "asia"],
        rating: 4.5,
        cms_affinity: &["WordPress"],
        ecommerce_level: 2,
        features: &["cdn", "staging", "backups", "support-24-7", "free-ssl"],
        plans: &[
            HostingPlan { name: "Startup", price: 30.0, storage_gb: 10 },
            HostingPlan { name: "Scale", price: 290.0, storage_gb: 50 },
            HostingPlan { name: "Dedicated", price: 600.0, storage_gb: 100 },
        ],
    },
    HostingProvider {
        name: "DigitalOcean",
        categories: &["cloud", "vps"],
        regions: &["global"],
        rating: 4.4,
        cms_affinity: &["WordPress", "Ghost", "Drupal"],
        ecommerce_level: 1,
        features: &["scalable", "api", "monitoring", "backups", "load-balancer"],
        plans: &[
            HostingPlan { name: "Basic Droplet", price: 6.0, storage_gb: 25 },
            HostingPlan { name: "General Purpose", price: 63.0, storage_gb: 100 },
            HostingPlan { name: "CPU-Optimized", price: 168.0, storage_gb: 200 },
        ],
    },
    HostingProvider {
        name: "Amazon Lightsail",
        categories: &["cloud", "vps", "enterprise"],
        regions: &["global"],
        rating: 4.3,
        cms_affinity: &["WordPress", "Magento", "Drupal"],
        ecommerce_level: 2,
        features: &["scalable", "api", "cdn", "load-balancer", "monitoring"],
        plans: &[
            HostingPlan { name: "Micro", price: 5.0, storage_gb: 40 },
            HostingPlan { name: "Large", price: 44.0, storage_gb: 160 },
            HostingPlan { name: "2XLarge", price: 160.0, storage_gb: 640 },
        ],
    },
    HostingProvider {
        name: "Google Cloud",
        categories: &["cloud", "enterprise", "dedicated"],
        regions: &["global"],
        rating: 4.2,
        cms_affinity: &["WordPress", "Drupal", "Magento"],
        ecommerce_level: 2,
        features: &["scalable", "api", "cdn", "load-balancer", "monitoring", "ddos-protection"],
        plans: &[
            HostingPlan { name: "e2-small", price: 15.0, storage_gb: 20 },
            HostingPlan { name: "n2-standard-4", price: 140.0, storage_gb: 100 },
            HostingPlan { name: "Enterprise", price: 400.0, storage_gb: 500 },
        ],
    },
    HostingProvider {
        name: "Hetzner",
        categories: &["vps", "budget", "cloud"],
        regions: &["eu"],
        rating: 4.6,
        cms_affinity: &["WordPress", "Ghost"],
        ecommerce_level: 1,
        features: &["scalable", "api", "backups", "ddos-protection"],
        plans: &[
            HostingPlan { name: "CX22", price: 4.59, storage_gb: 40 },
            HostingPlan { name: "CPX41", price: 28.0, storage_gb: 240 },
            HostingPlan { name: "AX42 Dedicated", price: 119.0, storage_gb: 1024 },
        ],
    },
    HostingProvider {
        name: "OVHcloud",
        categories: &["vps", "dedicated", "cloud"],
        regions: &["eu", "global"],
        rating: 4.0,
        cms_affinity: &["WordPress", "Drupal"],
        ecommerce_level: 1,
        features: &["ddos-protection", "api", "backups", "scalable"],
        plans: &[
            HostingPlan { name: "Starter", price: 3.5, storage_gb: 20 },
            HostingPlan { name: "Comfort", price: 13.0, storage_gb: 80 },
            HostingPlan { name: "Rise Dedicated", price: 99.0, storage_gb: 2000 },
        ],
    },
    HostingProvider {
        name: "Shopify",
        categories: &["managed", "cloud"],
        regions: &["global"],
        rating: 4.4,
        cms_affinity: &["Shopify"],
        ecommerce_level: 3,
        features: &["cdn", "free-ssl", "support-24-7", "ddos-protection"],
        plans: &[
            HostingPlan { name: "Basic", price: 29.0, storage_gb: 0 },
            HostingPlan { name: "Grow", price: 79.0, storage_gb: 0 },
            HostingPlan { name: "Advanced", price: 299.0, storage_gb: 0 },
        ],
    },
];

static TIER_PROFILES: &[TierProfile] = &[
    TierProfile {
        tier: TrafficTier::Personal,
        min_score: 0,
        min_monthly: 0.0,
        categories: &["shared", "budget"],
    },
    TierProfile {
        tier: TrafficTier::Startup,
        min_score: 25,
        min_monthly: 10.0,
        categories: &["shared", "vps", "cloud", "managed-wordpress"],
    },
    TierProfile {
        tier: TrafficTier::Business,
        min_score: 60,
        min_monthly: 30.0,
        categories: &["cloud", "vps", "managed", "managed-wordpress"],
    },
    TierProfile {
        tier: TrafficTier::Enterprise,
        min_score: 100,
        min_monthly: 100.0,
        categories: &["cloud", "dedicated", "enterprise"],
    },
];

static TIER_KEYWORDS: TierKeywords = TierKeywords {
    brand: &["bank", "finance", "insurance", "airlines", "global", "corp", "group", "holdings", "official"],
    industry: &["shop", "store", "travel", "hotel", "booking", "tech", "media", "agency", "clinic", "legal"],
    premium_tlds: &["com", "io", "co"],
    marketing: &["enterprise", "solutions", "careers", "investors", "press release", "our partners"],
    analytics: &["google-analytics", "googletagmanager", "gtag(", "hotjar", "segment.com", "mixpanel"],
    commerce: &["add to cart", "checkout", "book now", "buy now", "pricing", "free trial"],
    cdn_headers: &["cf-ray", "x-served-by", "x-cache", "x-amz-cf-id", "x-fastly-request-id", "x-cdn"],
    security_headers: &["strict-transport-security", "content-security-policy", "x-frame-options"],
};

static BUILTIN: Lazy<Arc<ReputationCatalog>> = Lazy::new(|| {
    Arc::new(ReputationCatalog {
        version: "2025.08",
        blacklist_zones: BLACKLIST_ZONES,
        sensitive_ports: SENSITIVE_PORTS,
        cms_signatures: CMS_SIGNATURES,
        host_fingerprints: HOST_FINGERPRINTS,
        providers: PROVIDERS,
        tier_profiles: TIER_PROFILES,
        tier_keywords: TIER_KEYWORDS.clone(),
    })
});

/// The production catalog, loaded once and shared process-wide.
pub fn builtin() -> Arc<ReputationCatalog> {
    Arc::clone(&BUILTIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_complete() {
        let catalog = builtin();
        assert_eq!(catalog.blacklist_zones.len(), 25);
        assert_eq!(catalog.tier_profiles.len(), 4);
        assert!(!catalog.cms_signatures.is_empty());
        assert!(!catalog.providers.is_empty());
    }

    #[test]
    fn telnet_is_catalogued_critical() {
        let catalog = builtin();
        let telnet = catalog.port_entry(23).unwrap();
        assert_eq!(telnet.risk, RiskTier::Critical);
        assert_eq!(telnet.service, "Telnet");
    }

    #[test]
    fn every_tier_has_a_profile() {
        let catalog = builtin();
        for tier in [
            TrafficTier::Personal,
            TrafficTier::Startup,
            TrafficTier::Business,
            TrafficTier::Enterprise,
        ] {
            let profile = catalog.tier_profile(tier);
            assert!(!profile.categories.is_empty());
        }
    }

    #[test]
    fn enterprise_floor_is_one_hundred() {
        let catalog = builtin();
        let profile = catalog.tier_profile(TrafficTier::Enterprise);
        assert_eq!(profile.min_monthly, 100.0);
    }
}
