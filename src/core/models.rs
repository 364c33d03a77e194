// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Target Classification ---

/// How the raw input was classified by the input classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Ipv4,
    Hostname,
}

/// The analyzed target: the raw input plus whatever resolution succeeded.
/// Resolution failures are normal (an IP without a PTR record, a hostname
/// that does not resolve) and leave the corresponding field empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub raw: String,
    pub kind: TargetKind,
    pub resolved_ip: Option<String>,
    pub resolved_hostname: Option<String>,
}

impl Target {
    /// The hostname to use for name-based probes, preferring the user's input
    /// over a reverse-lookup result.
    pub fn hostname(&self) -> Option<&str> {
        match self.kind {
            TargetKind::Hostname => Some(self.raw.as_str()),
            TargetKind::Ipv4 => self.resolved_hostname.as_deref(),
        }
    }
}

// --- Blacklist Prober Models ---

/// Outcome of probing a single DNSBL zone. `listed` and `error` are mutually
/// exclusive: an ambiguous lookup (timeout, SERVFAIL) sets `error` and is
/// never counted as a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistResult {
    pub name: String,
    pub zone: String,
    pub description: String,
    pub tier: u8,
    pub listed: bool,
    pub error: bool,
    pub details: Option<String>,
}

// --- Email-Auth Prober Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpfCheck {
    pub valid: bool,
    pub record: Option<String>,
    pub issues: Vec<String>,
}

/// DKIM has no generic selector to query, so this check is always an
/// informational stub: `valid` stays `None` and never contributes pass/fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimCheck {
    pub valid: Option<bool>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmarcCheck {
    pub valid: bool,
    pub record: Option<String>,
    pub policy: Option<String>,
}

/// Always present in the report. `checked: false` marks a probe that never
/// ran (IP-only target without a PTR name); its sub-checks then carry neutral
/// placeholder values and scoring maps the whole section to the neutral 50.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAuthConfig {
    pub checked: bool,
    pub spf: SpfCheck,
    pub dkim: DkimCheck,
    pub dmarc: DmarcCheck,
}

impl EmailAuthConfig {
    /// Placeholder for a target without a hostname to query.
    pub fn skipped() -> Self {
        Self {
            checked: false,
            spf: SpfCheck {
                valid: false,
                record: None,
                issues: Vec::new(),
            },
            dkim: DkimCheck {
                valid: None,
                status: "not checked: no hostname available".to_string(),
            },
            dmarc: DmarcCheck {
                valid: false,
                record: None,
                policy: None,
            },
        }
    }
}

// --- Certificate Prober Models ---

/// Everything extracted from the target's TLS certificate. `valid` means a
/// certificate was obtained and parsed; an expired or not-yet-valid one is
/// still `valid: true` with the window flags set. A failed handshake or parse
/// produces `valid: false` with `error` set and the metadata fields empty;
/// the prober never raises past its boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub valid: bool,
    pub error: Option<String>,
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub days_until_expiry: Option<i64>,
    pub is_expired: bool,
    pub is_not_yet_valid: bool,
    pub protocol: Option<String>,
    pub cipher: Option<String>,
    pub self_signed: bool,
    pub alt_names: Vec<String>,
    pub serial_number: Option<String>,
    pub fingerprint: Option<String>,
}

impl CertificateInfo {
    /// Result for a handshake or parse that did not produce a certificate.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            issuer: None,
            subject: None,
            valid_from: None,
            valid_to: None,
            days_until_expiry: None,
            is_expired: false,
            is_not_yet_valid: false,
            protocol: None,
            cipher: None,
            self_signed: false,
            alt_names: Vec::new(),
            serial_number: None,
            fingerprint: None,
        }
    }
}

// --- DNS-Health Prober Models ---

/// Always present in the report: each sub-lookup failure is recorded in
/// `issues` instead of escaping, and `checked: false` (the default) marks a
/// probe that never ran, which scoring maps to the neutral 50. `dnssec` stays
/// `None` when detection was inconclusive; it is advisory only and never
/// scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsHealth {
    pub checked: bool,
    pub ns_records: Vec<String>,
    pub mx_records: Vec<String>,
    pub caa_records: Vec<String>,
    pub has_caa: bool,
    pub a_records: Vec<String>,
    pub www_records: Vec<String>,
    pub issues: Vec<String>,
    pub dnssec: Option<bool>,
}

// --- Port Scanner Models ---

/// Risk classification for a sensitive port (also reused as threat severity).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Info,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPort {
    pub port: u16,
    pub service: String,
    pub risk: RiskTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIssue {
    pub port: u16,
    pub service: String,
    pub risk: RiskTier,
    pub description: String,
}

/// Raw port scan output. `timed_out_ports` are kept separate in the data so a
/// consumer can see which results are ambiguous, but scoring and issue
/// flagging treat them exactly like closed ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortScanResult {
    pub scanned: bool,
    pub open_ports: Vec<OpenPort>,
    pub closed_ports: Vec<u16>,
    pub timed_out_ports: Vec<u16>,
    pub security_issues: Vec<SecurityIssue>,
}

impl Default for PortScanResult {
    fn default() -> Self {
        Self {
            scanned: false,
            open_ports: Vec::new(),
            closed_ports: Vec::new(),
            timed_out_ports: Vec::new(),
            security_issues: Vec::new(),
        }
    }
}

// --- Hosting / CMS Fingerprint Models ---

/// Estimated site scale, ordered smallest to largest. Each tier carries a
/// minimum acceptable monthly hosting spend and a category allow-list in the
/// catalog; the estimate here only names the tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TrafficTier {
    Personal,
    Startup,
    Business,
    Enterprise,
}

/// One contributing signal of the traffic-tier heuristic, with its weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSignal {
    pub signal: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedPlan {
    pub name: String,
    pub price: f64,
    pub storage_gb: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedHost {
    pub name: String,
    pub match_score: u32,
    pub rating: f64,
    pub categories: Vec<String>,
    pub recommended_plan: RecommendedPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub cheapest: f64,
    pub average: f64,
    pub most_expensive: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOpportunity {
    pub provider: String,
    pub plan: String,
    pub price: f64,
    pub monthly_savings: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingAnalysis {
    pub cms: Option<String>,
    pub current_host: Option<String>,
    pub traffic_tier: TrafficTier,
    pub tier_confidence: u8,
    pub traffic_indicators: Vec<TrafficSignal>,
    pub recommended_hosts: Vec<RecommendedHost>,
    pub all_providers: Vec<String>,
    pub price_comparison: Option<PriceComparison>,
    pub savings_opportunities: Vec<SavingsOpportunity>,
    pub tier_warning: Option<String>,
}

impl Default for HostingAnalysis {
    fn default() -> Self {
        Self {
            cms: None,
            current_host: None,
            traffic_tier: TrafficTier::Personal,
            tier_confidence: 0,
            traffic_indicators: Vec::new(),
            recommended_hosts: Vec::new(),
            all_providers: Vec::new(),
            price_comparison: None,
            savings_opportunities: Vec::new(),
            tier_warning: None,
        }
    }
}

// --- Recommendation Engine Models ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action: String,
    pub impact: String,
}

// --- Threat Intelligence Models ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub category: String,
    pub source: String,
    pub severity: RiskTier,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatIntel {
    pub risk_level: RiskLevel,
    pub threats: Vec<Threat>,
    pub listing_count: u32,
    pub open_port_count: u32,
}

impl Default for ThreatIntel {
    fn default() -> Self {
        Self {
            risk_level: RiskLevel::Minimal,
            threats: Vec::new(),
            listing_count: 0,
            open_port_count: 0,
        }
    }
}

// --- Scores ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub score: u8,
    pub status: ScoreStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub blacklist: CategoryScore,
    pub email: CategoryScore,
    pub certificate: CategoryScore,
    pub dns_health: CategoryScore,
    pub port_security: CategoryScore,
}

// --- Main Report ---

/// The aggregate output for one analyzed target. Always fully constructed:
/// probers that could not run (no hostname, no resolvable IP) emit their
/// populated neutral placeholder instead of `null`, so consumers never need
/// per-field null checks, and contribute their documented neutral default to
/// the scores. Nothing persists between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationReport {
    pub target: Target,
    pub blacklist: Vec<BlacklistResult>,
    pub email_auth: EmailAuthConfig,
    pub certificate: CertificateInfo,
    pub dns_health: DnsHealth,
    pub port_scan: PortScanResult,
    pub hosting: HostingAnalysis,
    pub scores: CategoryScores,
    pub overall_score: u8,
    pub recommendations: Vec<Recommendation>,
    pub threat_intel: ThreatIntel,
    pub analysis_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_tier_orders_by_severity() {
        assert!(RiskTier::Critical > RiskTier::High);
        assert!(RiskTier::High > RiskTier::Medium);
        assert!(RiskTier::Medium > RiskTier::Info);
    }

    #[test]
    fn traffic_tiers_are_ordered() {
        assert!(TrafficTier::Personal < TrafficTier::Startup);
        assert!(TrafficTier::Startup < TrafficTier::Business);
        assert!(TrafficTier::Business < TrafficTier::Enterprise);
    }

    #[test]
    fn report_fields_serialize_camel_case() {
        let result = PortScanResult::default();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("openPorts").is_some());
        assert!(json.get("timedOutPorts").is_some());
        assert!(json.get("securityIssues").is_some());
    }

    #[test]
    fn skipped_probes_serialize_as_populated_objects() {
        let email = serde_json::to_value(EmailAuthConfig::skipped()).unwrap();
        assert_eq!(email.get("checked"), Some(&serde_json::Value::Bool(false)));
        assert!(email.get("spf").unwrap().is_object());
        assert!(email.get("dmarc").unwrap().is_object());

        let dns = serde_json::to_value(DnsHealth::default()).unwrap();
        assert_eq!(dns.get("checked"), Some(&serde_json::Value::Bool(false)));
        assert!(dns.get("nsRecords").unwrap().is_array());
    }

    #[test]
    fn dkim_stub_serializes_null_valid() {
        let dkim = DkimCheck {
            valid: None,
            status: "no generic selector".into(),
        };
        let json = serde_json::to_value(&dkim).unwrap();
        assert!(json.get("valid").unwrap().is_null());
    }
}
