// src/core/prober/input_classifier.rs

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::models::{Target, TargetKind};

/// Reduces whatever the user typed to a bare host: trims whitespace, strips a
/// scheme/path if a full URL was pasted, drops a trailing dot, lowercases.
pub fn normalize_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let host = if trimmed.contains("://") {
        Url::parse(trimmed)
            .ok()
            .and_then(|url| url.host_str().map(String::from))
            .unwrap_or_else(|| trimmed.to_string())
    } else {
        // A bare "host/path" form still carries a path worth dropping.
        trimmed
            .split(['/', '?', '#'])
            .next()
            .unwrap_or(trimmed)
            .to_string()
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Classifies the input as a strict IPv4 dotted-quad or a hostname, then
/// resolves the missing half. Forward resolution failure is non-fatal (the
/// analysis proceeds hostname-only); a missing PTR record is entirely normal.
pub async fn classify_target(input: &str) -> Target {
    let cleaned = normalize_input(input);

    if let Ok(ip) = Ipv4Addr::from_str(&cleaned) {
        info!(ip = %ip, "Input classified as IPv4 literal.");
        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        let resolved_hostname = match resolver.reverse_lookup(IpAddr::V4(ip)).await {
            Ok(ptr) => ptr
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string()),
            Err(e) => {
                debug!(ip = %ip, error = %e, "No PTR record for IP.");
                None
            }
        };
        return Target {
            raw: cleaned,
            kind: TargetKind::Ipv4,
            resolved_ip: Some(ip.to_string()),
            resolved_hostname,
        };
    }

    info!(host = %cleaned, "Input classified as hostname.");
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let resolved_ip = match resolver.ipv4_lookup(cleaned.clone()).await {
        Ok(lookup) => lookup.iter().next().map(|a| a.to_string()),
        Err(e) => {
            warn!(host = %cleaned, error = %e, "Forward resolution failed, proceeding hostname-only.");
            None
        }
    };
    Target {
        raw: cleaned,
        kind: TargetKind::Hostname,
        resolved_ip,
        resolved_hostname: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_scheme_and_path() {
        assert_eq!(normalize_input("https://Example.COM/about?x=1"), "example.com");
        assert_eq!(normalize_input("example.com/path"), "example.com");
        assert_eq!(normalize_input("  example.com.  "), "example.com");
    }

    #[test]
    fn strict_ipv4_parsing() {
        assert!(Ipv4Addr::from_str("8.8.8.8").is_ok());
        assert!(Ipv4Addr::from_str("1.2.3").is_err());
        assert!(Ipv4Addr::from_str("256.1.1.1").is_err());
        assert!(Ipv4Addr::from_str("8.8.8.8.8").is_err());
    }
}
