// src/core/mod.rs

/// All report data structures: the target classification, per-prober result
/// models, scores, recommendations, and the aggregate `ReputationReport`.
pub mod models;

/// The static reputation knowledge base: DNSBL zones, sensitive ports, CMS
/// signatures, host fingerprints, hosting providers, and tier profiles.
pub mod catalog;

/// The six probers and the engine that fans them out over one target.
pub mod prober;

/// Pure scoring of prober output into category and overall scores.
pub mod scoring;

/// Rule-based generation of prioritized remediation recommendations.
pub mod remediation;

/// Threat summarization across blacklist listings and exposed services.
pub mod threat_intel;
