// src/lib.rs

//! Reputation and network-posture analysis for a single hostname or IPv4
//! address: DNSBL blacklist checks, email sender authentication, TLS
//! certificate inspection, DNS health, a sensitive-port scan, and hosting/CMS
//! fingerprinting, aggregated into one scored report.
//!
//! ```no_run
//! # async fn demo() {
//! let report = reputon::analyze_reputation("example.com").await;
//! println!("overall score: {}", report.overall_score);
//! # }
//! ```

pub mod core;
pub mod logging;

pub use core::catalog::{ReputationCatalog, builtin as builtin_catalog};
pub use core::models::ReputationReport;
pub use core::prober::{ReputationEngine, analyze_reputation};
