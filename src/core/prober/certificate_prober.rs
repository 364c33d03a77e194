// src/core/prober/certificate_prober.rs

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, ClientConfig, RootCertStore, ServerName};
use tracing::{debug, info, warn};
use x509_parser::prelude::*;

use crate::core::models::CertificateInfo;

/// Overall budget for TCP connect + TLS handshake + extraction.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts any certificate chain. This prober inspects certificates, it never
/// enforces trust: expired, self-signed, and mis-issued certificates must all
/// survive the handshake so their metadata can be reported.
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: std::time::SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

/// Connects to port 443 with the hostname as SNI and extracts certificate
/// metadata plus the negotiated protocol and cipher. Every failure mode
/// (timeout, refused connection, handshake error, parse error) collapses to
/// `{valid: false, error}` — nothing escapes the prober boundary.
pub async fn run_certificate_probe(hostname: Option<&str>) -> CertificateInfo {
    let Some(host) = hostname else {
        debug!("No hostname available, skipping certificate probe.");
        return CertificateInfo::failed("no hostname available for TLS inspection");
    };

    info!(host, "Starting certificate probe.");
    match timeout(HANDSHAKE_TIMEOUT, inspect_certificate(host)).await {
        Ok(Ok(info)) => {
            info!(host, valid = info.valid, "Certificate probe finished.");
            info
        }
        Ok(Err(e)) => {
            warn!(host, error = %e, "Certificate probe failed.");
            CertificateInfo::failed(e)
        }
        Err(_) => {
            warn!(host, "Certificate probe timed out.");
            CertificateInfo::failed("TLS handshake timed out after 10s")
        }
    }
}

async fn inspect_certificate(host: &str) -> Result<CertificateInfo, String> {
    let mut config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(RootCertStore::empty())
        .with_no_client_auth();
    config
        .dangerous()
        .set_certificate_verifier(Arc::new(AcceptAnyCert));
    let connector = TlsConnector::from(Arc::new(config));

    let server_name =
        ServerName::try_from(host).map_err(|e| format!("invalid SNI name: {}", e))?;

    debug!(host, "Connecting TCP stream to port 443.");
    let tcp = TcpStream::connect((host, 443))
        .await
        .map_err(|e| format!("TCP connection failed: {}", e))?;

    debug!(host, "Performing TLS handshake.");
    let tls = connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| format!("TLS handshake failed: {}", e))?;

    let (_, session) = tls.get_ref();
    let protocol = session.protocol_version().map(|v| match v {
        rustls::ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        rustls::ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        other => format!("{:?}", other),
    });
    let cipher = session
        .negotiated_cipher_suite()
        .map(|s| format!("{:?}", s.suite()));

    let der = session
        .peer_certificates()
        .and_then(|certs| certs.first())
        .map(|cert| cert.0.clone())
        .ok_or_else(|| "server presented no certificate".to_string())?;

    let (_, x509) =
        parse_x509_certificate(&der).map_err(|e| format!("X.509 parse error: {}", e))?;

    let now = Utc::now();
    let validity = x509.validity();
    let not_before = asn1_time_to_chrono_utc(&validity.not_before);
    let not_after = asn1_time_to_chrono_utc(&validity.not_after);
    let days_until_expiry = not_after.signed_duration_since(now).num_days();
    let is_expired = now > not_after;
    let is_not_yet_valid = now < not_before;

    let subject_cn = common_name(x509.subject());
    let issuer_cn = common_name(x509.issuer());
    let self_signed = match (&subject_cn, &issuer_cn) {
        (Some(s), Some(i)) => s == i,
        _ => x509.subject() == x509.issuer(),
    };

    let mut alt_names = Vec::new();
    if let Ok(Some(san)) = x509.subject_alternative_name() {
        for name in &san.value.general_names {
            if let GeneralName::DNSName(dns) = name {
                alt_names.push(dns.to_string());
            }
        }
    }

    let digest = Sha256::digest(&der);
    let fingerprint = digest
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":");

    debug!(
        subject = %x509.subject(),
        issuer = %x509.issuer(),
        days_until_expiry,
        "Parsed peer certificate."
    );

    Ok(CertificateInfo {
        // valid means a certificate was obtained and parsed; window problems
        // are reported through is_expired / is_not_yet_valid and scored there.
        valid: true,
        error: None,
        issuer: Some(x509.issuer().to_string()),
        subject: Some(x509.subject().to_string()),
        valid_from: Some(not_before),
        valid_to: Some(not_after),
        days_until_expiry: Some(days_until_expiry),
        is_expired,
        is_not_yet_valid,
        protocol,
        cipher,
        self_signed,
        alt_names,
        serial_number: Some(x509.raw_serial_as_string()),
        fingerprint: Some(fingerprint),
    })
}

fn common_name(name: &X509Name) -> Option<String> {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(String::from)
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_hostname_reports_invalid_not_error() {
        let info = run_certificate_probe(None).await;
        assert!(!info.valid);
        assert!(info.error.is_some());
        assert!(info.issuer.is_none());
    }
}
