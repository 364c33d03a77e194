// src/core/remediation.rs

//! Turns prober findings into an ordered list of concrete remediation steps.
//! Rules run in severity order so the output reads top-down as a work queue;
//! a fully clean report still gets one reassuring entry so the list is never
//! empty.

use tracing::debug;

use crate::core::models::{
    BlacklistResult, CertificateInfo, DnsHealth, EmailAuthConfig, PortScanResult, Priority,
    Recommendation, RiskTier,
};

/// Overall scores below this get a standing "keep monitoring" item.
const MONITORING_THRESHOLD: u8 = 70;
/// Certificates expiring within this many days warrant action now.
const EXPIRY_WARNING_DAYS: i64 = 30;

pub fn build_recommendations(
    blacklist: &[BlacklistResult],
    email: &EmailAuthConfig,
    certificate: &CertificateInfo,
    dns: &DnsHealth,
    ports: &PortScanResult,
    overall_score: u8,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    blacklist_rules(blacklist, &mut recommendations);
    certificate_rules(certificate, &mut recommendations);
    port_rules(ports, &mut recommendations);
    dns_rules(dns, &mut recommendations);
    email_rules(email, &mut recommendations);

    if !recommendations.is_empty() && overall_score < MONITORING_THRESHOLD {
        recommendations.push(Recommendation {
            priority: Priority::Low,
            title: "Re-check after remediation".to_string(),
            description: format!(
                "The overall score of {} leaves room for improvement across several categories.",
                overall_score
            ),
            action: "Work through the items above, then run the analysis again to confirm each fix took effect.".to_string(),
            impact: "Tracks progress and catches regressions early.".to_string(),
        });
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            priority: Priority::Low,
            title: "Reputation looks healthy".to_string(),
            description: "No blacklist listings, certificate problems, risky open ports, or email-authentication gaps were found.".to_string(),
            action: "Schedule periodic re-checks; reputation can change without any action on your part.".to_string(),
            impact: "Early detection keeps small problems from becoming deliverability incidents.".to_string(),
        });
    }

    debug!(count = recommendations.len(), "Recommendations built.");
    recommendations
}

fn blacklist_rules(blacklist: &[BlacklistResult], out: &mut Vec<Recommendation>) {
    let listings: Vec<&BlacklistResult> = blacklist.iter().filter(|r| r.listed).collect();
    if listings.is_empty() {
        return;
    }
    let names: Vec<&str> = listings.iter().map(|r| r.name.as_str()).collect();
    out.push(Recommendation {
        priority: Priority::High,
        title: format!(
            "Request delisting from {} blacklist{}",
            listings.len(),
            if listings.len() == 1 { "" } else { "s" }
        ),
        description: format!("The IP address is listed on: {}.", names.join(", ")),
        action: "Identify and stop the cause (compromised host, open relay, spam campaign), then submit delisting requests through each operator's removal form.".to_string(),
        impact: "Listings cause mail rejection and damage sender reputation across providers.".to_string(),
    });
}

fn certificate_rules(cert: &CertificateInfo, out: &mut Vec<Recommendation>) {
    if !cert.valid {
        out.push(Recommendation {
            priority: Priority::High,
            title: "Fix the TLS certificate".to_string(),
            description: cert
                .error
                .clone()
                .unwrap_or_else(|| "The certificate is expired or not yet valid.".to_string()),
            action: "Install a valid certificate from a trusted authority; free automated issuance (e.g. ACME) removes renewal as a failure mode.".to_string(),
            impact: "Browsers block visitors with a full-page warning when the certificate is invalid.".to_string(),
        });
        return;
    }

    if cert.is_expired || cert.is_not_yet_valid {
        out.push(Recommendation {
            priority: Priority::High,
            title: "Replace the certificate outside its validity window".to_string(),
            description: if cert.is_expired {
                "The certificate has expired.".to_string()
            } else {
                "The certificate is not yet valid.".to_string()
            },
            action: "Issue a fresh certificate and enable automated renewal.".to_string(),
            impact: "Browsers block visitors with a full-page warning when the certificate is outside its validity window.".to_string(),
        });
    } else if let Some(days) = cert.days_until_expiry {
        if days <= EXPIRY_WARNING_DAYS {
            out.push(Recommendation {
                priority: Priority::High,
                title: "Renew the TLS certificate".to_string(),
                description: format!("The certificate expires in {} day{}.", days, if days == 1 { "" } else { "s" }),
                action: "Renew now and enable automated renewal so the window never gets this short again.".to_string(),
                impact: "An expired certificate takes the site offline for most visitors.".to_string(),
            });
        }
    }

    if cert.self_signed {
        out.push(Recommendation {
            priority: Priority::High,
            title: "Replace the self-signed certificate".to_string(),
            description: "The server presents a self-signed certificate that no browser trusts.".to_string(),
            action: "Issue a certificate from a publicly trusted authority for the public-facing hostname.".to_string(),
            impact: "Self-signed certificates trigger security warnings and break API clients.".to_string(),
        });
    }

    if let Some(protocol) = cert.protocol.as_deref() {
        if protocol != "TLSv1.3" && protocol != "TLSv1.2" {
            out.push(Recommendation {
                priority: Priority::High,
                title: "Disable legacy TLS protocols".to_string(),
                description: format!("The server negotiated {}, which is deprecated.", protocol),
                action: "Restrict the server configuration to TLS 1.2 and 1.3.".to_string(),
                impact: "Legacy protocol versions have known cryptographic weaknesses.".to_string(),
            });
        }
    }
}

fn port_rules(ports: &PortScanResult, out: &mut Vec<Recommendation>) {
    for issue in &ports.security_issues {
        let priority = match issue.risk {
            RiskTier::Critical => Priority::High,
            _ => Priority::Medium,
        };
        out.push(Recommendation {
            priority,
            title: format!("Close or firewall port {} ({})", issue.port, issue.service),
            description: issue.description.clone(),
            action: format!(
                "Bind {} to an internal interface, restrict it with firewall rules, or tunnel access through a VPN.",
                issue.service
            ),
            impact: "Exposed management and database services are primary targets for automated attacks.".to_string(),
        });
    }
}

fn dns_rules(health: &DnsHealth, out: &mut Vec<Recommendation>) {
    if !health.checked {
        return;
    }

    if health.ns_records.len() < 2 && !health.ns_records.is_empty() {
        out.push(Recommendation {
            priority: Priority::Medium,
            title: "Add a second authoritative name server".to_string(),
            description: "Only one authoritative name server answers for this domain.".to_string(),
            action: "Configure at least two name servers on separate networks.".to_string(),
            impact: "A single name server is a single point of failure for the entire domain.".to_string(),
        });
    }

    if !health.has_caa {
        out.push(Recommendation {
            priority: Priority::Low,
            title: "Publish a CAA record".to_string(),
            description: "No CAA record restricts which authorities may issue certificates for this domain.".to_string(),
            action: "Add a CAA record naming your certificate authority.".to_string(),
            impact: "CAA prevents mis-issuance by unauthorized certificate authorities.".to_string(),
        });
    }

    for issue in &health.issues {
        out.push(Recommendation {
            priority: Priority::Medium,
            title: "Resolve DNS inconsistency".to_string(),
            description: issue.clone(),
            action: "Review the zone configuration with your DNS provider.".to_string(),
            impact: "DNS inconsistencies cause intermittent reachability problems that are hard to diagnose.".to_string(),
        });
    }
}

fn email_rules(config: &EmailAuthConfig, out: &mut Vec<Recommendation>) {
    if !config.checked {
        return;
    }

    if !config.spf.valid {
        out.push(Recommendation {
            priority: Priority::High,
            title: "Publish an SPF record".to_string(),
            description: "No SPF record authorizes mail servers for this domain.".to_string(),
            action: "Add a TXT record starting with v=spf1 listing your sending infrastructure, ending in -all or ~all.".to_string(),
            impact: "Without SPF, anyone can send mail claiming to be from this domain and receivers have no way to tell.".to_string(),
        });
    } else {
        for issue in &config.spf.issues {
            out.push(Recommendation {
                priority: Priority::Medium,
                title: "Fix the SPF record".to_string(),
                description: issue.clone(),
                action: "Correct the SPF record so receivers evaluate it as intended.".to_string(),
                impact: "A broken SPF record can be worse than none at all.".to_string(),
            });
        }
    }

    if !config.dmarc.valid {
        out.push(Recommendation {
            priority: Priority::Medium,
            title: "Publish a DMARC record".to_string(),
            description: "No DMARC policy tells receivers what to do with mail that fails authentication.".to_string(),
            action: "Add a TXT record at _dmarc.<domain> starting with v=DMARC1; begin with p=none and a reporting address, then tighten.".to_string(),
            impact: "DMARC closes the gap that lets spoofed mail through even when SPF exists.".to_string(),
        });
    } else if config.dmarc.policy.as_deref() == Some("none") {
        out.push(Recommendation {
            priority: Priority::Low,
            title: "Tighten the DMARC policy".to_string(),
            description: "DMARC is published but p=none means failing mail is still delivered.".to_string(),
            action: "Move to p=quarantine and then p=reject once reports show legitimate mail passes.".to_string(),
            impact: "Only an enforcing policy actually stops spoofed mail.".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DkimCheck, DmarcCheck, SecurityIssue, SpfCheck};

    fn valid_cert() -> CertificateInfo {
        let mut cert = CertificateInfo::failed("");
        cert.valid = true;
        cert.error = None;
        cert.days_until_expiry = Some(90);
        cert.protocol = Some("TLSv1.3".to_string());
        cert
    }

    #[test]
    fn clean_report_gets_reassurance() {
        let recs = build_recommendations(
            &[],
            &EmailAuthConfig::skipped(),
            &valid_cert(),
            &DnsHealth::default(),
            &PortScanResult::default(),
            95,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
        assert!(recs[0].title.contains("healthy"));
    }

    #[test]
    fn listings_come_first_at_high_priority() {
        let listing = BlacklistResult {
            name: "Spamhaus ZEN".into(),
            zone: "zen.spamhaus.org".into(),
            description: String::new(),
            tier: 1,
            listed: true,
            error: false,
            details: Some("127.0.0.2".into()),
        };
        let recs = build_recommendations(
            &[listing],
            &EmailAuthConfig::skipped(),
            &valid_cert(),
            &DnsHealth::default(),
            &PortScanResult::default(),
            60,
        );
        assert_eq!(recs[0].priority, Priority::High);
        assert!(recs[0].description.contains("Spamhaus ZEN"));
    }

    #[test]
    fn invalid_cert_short_circuits_other_cert_rules() {
        let cert = CertificateInfo::failed("TLS handshake failed");
        let recs = build_recommendations(
            &[],
            &EmailAuthConfig::skipped(),
            &cert,
            &DnsHealth::default(),
            &PortScanResult::default(),
            80,
        );
        let cert_recs: Vec<_> = recs.iter().filter(|r| r.title.contains("certificate") || r.title.contains("TLS")).collect();
        assert_eq!(cert_recs.len(), 1);
        assert_eq!(cert_recs[0].priority, Priority::High);
    }

    #[test]
    fn expired_but_parsed_certificate_gets_replacement_advice() {
        let mut cert = valid_cert();
        cert.is_expired = true;
        cert.days_until_expiry = Some(-10);
        let recs = build_recommendations(
            &[],
            &EmailAuthConfig::skipped(),
            &cert,
            &DnsHealth::default(),
            &PortScanResult::default(),
            80,
        );
        let rec = recs
            .iter()
            .find(|r| r.title.contains("validity window"))
            .unwrap();
        assert_eq!(rec.priority, Priority::High);
        // No additional "expires in -10 days" renewal item.
        assert!(!recs.iter().any(|r| r.title == "Renew the TLS certificate"));
    }

    #[test]
    fn critical_port_issue_is_high_priority() {
        let ports = PortScanResult {
            scanned: true,
            security_issues: vec![SecurityIssue {
                port: 3389,
                service: "RDP".into(),
                risk: RiskTier::Critical,
                description: "RDP (port 3389) is reachable from the public internet".into(),
            }],
            ..PortScanResult::default()
        };
        let recs = build_recommendations(
            &[],
            &EmailAuthConfig::skipped(),
            &valid_cert(),
            &DnsHealth::default(),
            &ports,
            75,
        );
        let port_rec = recs.iter().find(|r| r.title.contains("3389")).unwrap();
        assert_eq!(port_rec.priority, Priority::High);
    }

    #[test]
    fn missing_spf_outranks_missing_dmarc() {
        let email = EmailAuthConfig {
            checked: true,
            spf: SpfCheck { valid: false, record: None, issues: vec![] },
            dkim: DkimCheck { valid: None, status: String::new() },
            dmarc: DmarcCheck { valid: false, record: None, policy: None },
        };
        let recs = build_recommendations(
            &[],
            &email,
            &valid_cert(),
            &DnsHealth::default(),
            &PortScanResult::default(),
            65,
        );
        let spf = recs.iter().find(|r| r.title.contains("SPF")).unwrap();
        let dmarc = recs.iter().find(|r| r.title.contains("DMARC")).unwrap();
        assert_eq!(spf.priority, Priority::High);
        assert_eq!(dmarc.priority, Priority::Medium);
    }

    #[test]
    fn permissive_dmarc_gets_tightening_advice() {
        let email = EmailAuthConfig {
            checked: true,
            spf: SpfCheck { valid: true, record: Some("v=spf1 -all".into()), issues: vec![] },
            dkim: DkimCheck { valid: None, status: String::new() },
            dmarc: DmarcCheck { valid: true, record: None, policy: Some("none".into()) },
        };
        let recs = build_recommendations(
            &[],
            &email,
            &valid_cert(),
            &DnsHealth::default(),
            &PortScanResult::default(),
            85,
        );
        assert!(recs.iter().any(|r| r.title.contains("Tighten")));
    }

    #[test]
    fn mediocre_score_appends_monitoring_item() {
        let email = EmailAuthConfig {
            checked: true,
            spf: SpfCheck { valid: false, record: None, issues: vec![] },
            dkim: DkimCheck { valid: None, status: String::new() },
            dmarc: DmarcCheck { valid: false, record: None, policy: None },
        };
        let recs = build_recommendations(
            &[],
            &email,
            &valid_cert(),
            &DnsHealth::default(),
            &PortScanResult::default(),
            55,
        );
        let last = recs.last().unwrap();
        assert!(last.title.contains("Re-check"));
        assert_eq!(last.priority, Priority::Low);
    }
}
