// src/core/prober/email_auth_prober.rs

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::core::models::{DkimCheck, DmarcCheck, EmailAuthConfig, SpfCheck};

static DMARC_POLICY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bp\s*=\s*(none|quarantine|reject)").unwrap());

const DKIM_STATUS: &str =
    "DKIM uses per-provider selectors that cannot be discovered generically; verify signing in your mail provider's control panel";

/// Checks the domain's email sender-authentication posture: SPF and DMARC TXT
/// records, plus a fixed informational DKIM stub. Requires a hostname; for a
/// target without one this returns the skipped placeholder, which scores
/// neutral. Any DNS failure is treated as "unconfigured" (`valid: false`),
/// not an error.
pub async fn run_email_auth_probe(hostname: Option<&str>) -> EmailAuthConfig {
    let Some(domain) = hostname else {
        debug!("No hostname available, skipping email-auth probe.");
        return EmailAuthConfig::skipped();
    };
    let root = domain.strip_prefix("www.").unwrap_or(domain);

    info!(domain = %root, "Starting email-auth probe.");
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let (spf, dmarc) = tokio::join!(lookup_spf(&resolver, root), lookup_dmarc(&resolver, root));

    info!(spf_valid = spf.valid, dmarc_valid = dmarc.valid, "Email-auth probe finished.");
    EmailAuthConfig {
        checked: true,
        spf,
        dkim: DkimCheck {
            valid: None,
            status: DKIM_STATUS.to_string(),
        },
        dmarc,
    }
}

/// SPF lives in a TXT record on the apex starting with "v=spf1".
async fn lookup_spf(resolver: &TokioAsyncResolver, domain: &str) -> SpfCheck {
    match resolver.txt_lookup(domain.to_string()).await {
        Ok(txt_records) => {
            for record in txt_records.iter() {
                let record_str = record.to_string();
                if record_str.starts_with("v=spf1") {
                    debug!(record = %record_str, "SPF record found.");
                    return SpfCheck {
                        valid: true,
                        record: Some(record_str),
                        issues: spf_issues(txt_records.iter().map(|r| r.to_string())),
                    };
                }
            }
            debug!(domain, "No SPF record among TXT records.");
            SpfCheck {
                valid: false,
                record: None,
                issues: vec![
                    "No SPF record found; publish a TXT record starting with v=spf1 listing your authorized mail servers".to_string(),
                ],
            }
        }
        Err(e) => {
            warn!(domain, error = %e, "SPF lookup failed, treating as unconfigured.");
            SpfCheck {
                valid: false,
                record: None,
                issues: vec![
                    "SPF could not be verified; publish a TXT record starting with v=spf1".to_string(),
                ],
            }
        }
    }
}

fn spf_issues(records: impl Iterator<Item = String>) -> Vec<String> {
    let spf: Vec<String> = records.filter(|r| r.starts_with("v=spf1")).collect();
    let mut issues = Vec::new();
    if spf.len() > 1 {
        issues.push("Multiple SPF records published; receivers treat this as a permanent error".to_string());
    }
    if spf.iter().any(|r| r.trim_end().ends_with("+all")) {
        issues.push("SPF ends with +all, which authorizes any sender".to_string());
    }
    issues
}

/// DMARC lives in a TXT record at `_dmarc.<domain>` starting with "v=DMARC1";
/// the `p=` tag carries the enforcement policy.
async fn lookup_dmarc(resolver: &TokioAsyncResolver, domain: &str) -> DmarcCheck {
    let dmarc_name = format!("_dmarc.{}", domain);
    match resolver.txt_lookup(dmarc_name.clone()).await {
        Ok(txt_records) => {
            for record in txt_records.iter() {
                let record_str = record.to_string();
                if record_str.starts_with("v=DMARC1") {
                    let policy = DMARC_POLICY_RE
                        .captures(&record_str)
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str().to_lowercase())
                        .unwrap_or_else(|| "unknown".to_string());
                    debug!(record = %record_str, policy = %policy, "DMARC record found.");
                    return DmarcCheck {
                        valid: true,
                        record: Some(record_str),
                        policy: Some(policy),
                    };
                }
            }
            debug!(name = %dmarc_name, "No DMARC record found.");
            DmarcCheck {
                valid: false,
                record: None,
                policy: None,
            }
        }
        Err(e) => {
            warn!(name = %dmarc_name, error = %e, "DMARC lookup failed, treating as unconfigured.");
            DmarcCheck {
                valid: false,
                record: None,
                policy: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_hostname_yields_skipped_placeholder() {
        let config = run_email_auth_probe(None).await;
        assert!(!config.checked);
        assert!(!config.spf.valid);
        assert!(!config.dmarc.valid);
        assert!(config.dkim.valid.is_none());
    }

    #[test]
    fn duplicate_spf_records_are_flagged() {
        let issues = spf_issues(
            ["v=spf1 include:a.example -all", "v=spf1 include:b.example -all"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("Multiple SPF"));
    }

    #[test]
    fn dmarc_policy_extraction() {
        let grab = |record: &str| {
            DMARC_POLICY_RE
                .captures(record)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_lowercase())
        };
        assert_eq!(grab("v=DMARC1; p=reject; rua=mailto:x@y"), Some("reject".into()));
        assert_eq!(grab("v=DMARC1; p = Quarantine"), Some("quarantine".into()));
        assert_eq!(grab("v=DMARC1; sp=none"), None);
    }

    #[test]
    fn permissive_all_is_flagged() {
        let issues = spf_issues(["v=spf1 +all".to_string()].into_iter());
        assert!(issues.iter().any(|i| i.contains("+all")));
    }
}
