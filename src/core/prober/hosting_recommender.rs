// src/core/prober/hosting_recommender.rs

//! Tier-aware hosting recommendations: pure functions over the provider
//! catalog. The traffic tier sets a minimum monthly spend and a category
//! allow-list; explicit filters (region, e-commerce level, required features,
//! storage) narrow further, and a composite match score ranks what remains.

use std::sync::Arc;
use tracing::debug;

use crate::core::catalog::{HostingPlan, HostingProvider, ReputationCatalog, TierProfile};
use crate::core::models::{
    PriceComparison, RecommendedHost, RecommendedPlan, SavingsOpportunity, TrafficTier,
};

/// What the caller cares most about; adds a flat bonus to providers that
/// exhibit the matching trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingPriority {
    Speed,
    Budget,
    Support,
    Uptime,
    Scalability,
    Security,
    Ecommerce,
}

/// Optional explicit constraints layered on top of the tier defaults.
#[derive(Debug, Clone, Default)]
pub struct HostingFilters {
    pub region: Option<String>,
    pub min_ecommerce_level: Option<u8>,
    pub required_features: Vec<String>,
    pub min_storage_gb: Option<u32>,
    pub priority: Option<HostingPriority>,
}

#[derive(Debug, Clone)]
pub struct TierRecommendation {
    pub hosts: Vec<RecommendedHost>,
    pub price_comparison: Option<PriceComparison>,
    pub tier_warning: Option<String>,
}

const MAX_RECOMMENDATIONS: usize = 5;
/// A provider must cover at least this share of the required features.
const FEATURE_OVERLAP_FLOOR: f64 = 0.7;

/// Filters the catalog for the given CMS and tier and ranks the survivors.
/// A provider qualifies only with a plan at or above the tier's monthly
/// floor; the cheapest such plan becomes the recommendation. If the floor
/// eliminates everyone, it is relaxed and `tier_warning` says so, because the
/// report must always carry actionable data.
pub fn recommended_hosts_for_tier(
    catalog: &Arc<ReputationCatalog>,
    cms: Option<&str>,
    tier: TrafficTier,
    filters: &HostingFilters,
) -> TierRecommendation {
    let profile = catalog.tier_profile(tier);

    let mut hosts = collect_matches(catalog, profile, cms, filters, profile.min_monthly);
    let mut tier_warning = None;
    if hosts.is_empty() {
        hosts = collect_matches(catalog, profile, cms, filters, 0.0);
        if !hosts.is_empty() {
            tier_warning = Some(format!(
                "no catalogued provider meets the ${:.0}/mo floor expected at this traffic tier; showing the closest matches below it",
                profile.min_monthly
            ));
        }
    }

    hosts.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then(b.rating.total_cmp(&a.rating))
    });
    hosts.truncate(MAX_RECOMMENDATIONS);

    debug!(tier = ?tier, matches = hosts.len(), "Ranked hosting recommendations.");
    TierRecommendation {
        price_comparison: price_comparison(&hosts),
        hosts,
        tier_warning,
    }
}

/// Cheaper catalogued alternatives to the current host that still meet the
/// tier's price floor, ranked cheapest first. Requires the current host to be
/// identifiable in the catalog and itself able to meet the floor.
pub fn savings_opportunities(
    catalog: &Arc<ReputationCatalog>,
    current_host: Option<&str>,
    tier: TrafficTier,
) -> Vec<SavingsOpportunity> {
    let Some(name) = current_host else {
        return Vec::new();
    };
    let Some(current) = catalog.provider(name) else {
        return Vec::new();
    };
    let profile = catalog.tier_profile(tier);
    let Some(current_plan) = qualifying_plan(current, profile.min_monthly, None) else {
        return Vec::new();
    };

    let mut savings: Vec<SavingsOpportunity> = catalog
        .providers
        .iter()
        .filter(|p| !p.name.eq_ignore_ascii_case(current.name))
        .filter_map(|p| qualifying_plan(p, profile.min_monthly, None).map(|plan| (p, plan)))
        .filter(|(_, plan)| plan.price < current_plan.price)
        .map(|(p, plan)| SavingsOpportunity {
            provider: p.name.to_string(),
            plan: plan.name.to_string(),
            price: plan.price,
            monthly_savings: current_plan.price - plan.price,
        })
        .collect();
    savings.sort_by(|a, b| a.price.total_cmp(&b.price));
    savings
}

fn collect_matches(
    catalog: &Arc<ReputationCatalog>,
    profile: &TierProfile,
    cms: Option<&str>,
    filters: &HostingFilters,
    price_floor: f64,
) -> Vec<RecommendedHost> {
    catalog
        .providers
        .iter()
        .filter(|p| passes_static_filters(p, profile, cms, filters))
        .filter_map(|p| {
            qualifying_plan(p, price_floor, filters.min_storage_gb).map(|plan| RecommendedHost {
                name: p.name.to_string(),
                match_score: match_score(p, cms, filters, plan),
                rating: p.rating,
                categories: p.categories.iter().map(|c| c.to_string()).collect(),
                recommended_plan: RecommendedPlan {
                    name: plan.name.to_string(),
                    price: plan.price,
                    storage_gb: (plan.storage_gb > 0).then_some(plan.storage_gb),
                },
            })
        })
        .collect()
}

fn passes_static_filters(
    provider: &HostingProvider,
    profile: &TierProfile,
    cms: Option<&str>,
    filters: &HostingFilters,
) -> bool {
    let category_fits = provider
        .categories
        .iter()
        .any(|c| profile.categories.contains(c));
    if !category_fits {
        return false;
    }

    if let Some(cms) = cms {
        if !provider
            .cms_affinity
            .iter()
            .any(|a| a.eq_ignore_ascii_case(cms))
        {
            return false;
        }
    }

    if let Some(region) = &filters.region {
        let region_fits = provider
            .regions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(region) || *r == "global");
        if !region_fits {
            return false;
        }
    }

    if let Some(level) = filters.min_ecommerce_level {
        if provider.ecommerce_level < level {
            return false;
        }
    }

    if !filters.required_features.is_empty()
        && feature_overlap(provider, &filters.required_features) < FEATURE_OVERLAP_FLOOR
    {
        return false;
    }

    true
}

fn feature_overlap(provider: &HostingProvider, required: &[String]) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    let matched = required
        .iter()
        .filter(|f| {
            provider
                .features
                .iter()
                .any(|have| have.eq_ignore_ascii_case(f))
        })
        .count();
    matched as f64 / required.len() as f64
}

/// The cheapest plan at or above the price floor that also satisfies the
/// storage filter, if any.
fn qualifying_plan<'a>(
    provider: &'a HostingProvider,
    price_floor: f64,
    min_storage_gb: Option<u32>,
) -> Option<&'a HostingPlan> {
    provider
        .plans
        .iter()
        .filter(|plan| plan.price >= price_floor)
        .filter(|plan| min_storage_gb.is_none_or(|gb| plan.storage_gb >= gb))
        .min_by(|a, b| a.price.total_cmp(&b.price))
}

/// Composite ranking score: CMS affinity, rating, region fit, e-commerce
/// capability, required-feature overlap, and a bonus for the caller's stated
/// priority. Higher is better; the exact weights are product decisions.
fn match_score(
    provider: &HostingProvider,
    cms: Option<&str>,
    filters: &HostingFilters,
    plan: &HostingPlan,
) -> u32 {
    let mut score: u32 = 0;

    if let Some(cms) = cms {
        if provider
            .cms_affinity
            .iter()
            .any(|a| a.eq_ignore_ascii_case(cms))
        {
            score += 25;
        }
    }

    score += (provider.rating * 10.0).round() as u32;

    if let Some(region) = &filters.region {
        if provider
            .regions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(region))
        {
            score += 10;
        } else if provider.regions.contains(&"global") {
            score += 5;
        }
    }

    score += provider.ecommerce_level as u32 * 5;

    if !filters.required_features.is_empty() {
        score += (feature_overlap(provider, &filters.required_features) * 10.0).round() as u32;
    }

    if let Some(priority) = filters.priority {
        if priority_satisfied(provider, plan, priority) {
            score += 15;
        }
    }

    score
}

fn priority_satisfied(
    provider: &HostingProvider,
    plan: &HostingPlan,
    priority: HostingPriority,
) -> bool {
    let has = |f: &str| provider.features.iter().any(|have| *have == f);
    match priority {
        HostingPriority::Speed => has("cdn"),
        HostingPriority::Budget => provider.categories.contains(&"budget") || plan.price <= 15.0,
        HostingPriority::Support => has("support-24-7"),
        HostingPriority::Uptime => has("monitoring") || has("load-balancer"),
        HostingPriority::Scalability => has("scalable"),
        HostingPriority::Security => has("ddos-protection"),
        HostingPriority::Ecommerce => provider.ecommerce_level >= 2,
    }
}

fn price_comparison(hosts: &[RecommendedHost]) -> Option<PriceComparison> {
    if hosts.is_empty() {
        return None;
    }
    let prices: Vec<f64> = hosts.iter().map(|h| h.recommended_plan.price).collect();
    let cheapest = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let most_expensive = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = prices.iter().sum::<f64>() / prices.len() as f64;
    Some(PriceComparison {
        cheapest,
        average,
        most_expensive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{
        BlacklistZone, CmsSignature, HostFingerprint, ReputationCatalog, SensitivePort,
        TierKeywords, TierProfile,
    };

    static FIXTURE_PROVIDERS: &[HostingProvider] = &[
        HostingProvider {
            name: "PennyHost",
            categories: &["cloud"],
            regions: &["global"],
            rating: 4.0,
            cms_affinity: &["WordPress"],
            ecommerce_level: 1,
            features: &["free-ssl"],
            plans: &[HostingPlan { name: "Only", price: 5.0, storage_gb: 10 }],
        },
        HostingProvider {
            name: "IronScale",
            categories: &["cloud", "enterprise"],
            regions: &["us", "eu"],
            rating: 4.5,
            cms_affinity: &["WordPress", "Drupal"],
            ecommerce_level: 2,
            features: &["cdn", "scalable", "support-24-7", "ddos-protection"],
            plans: &[
                HostingPlan { name: "Entry", price: 40.0, storage_gb: 50 },
                HostingPlan { name: "Fleet", price: 150.0, storage_gb: 200 },
            ],
        },
        HostingProvider {
            name: "MidBox",
            categories: &["cloud"],
            regions: &["us"],
            rating: 4.1,
            cms_affinity: &["WordPress"],
            ecommerce_level: 1,
            features: &["cdn", "backups"],
            plans: &[HostingPlan { name: "Std", price: 120.0, storage_gb: 80 }],
        },
    ];

    static FIXTURE_TIERS: &[TierProfile] = &[
        TierProfile { tier: TrafficTier::Personal, min_score: 0, min_monthly: 0.0, categories: &["cloud"] },
        TierProfile { tier: TrafficTier::Startup, min_score: 25, min_monthly: 10.0, categories: &["cloud"] },
        TierProfile { tier: TrafficTier::Business, min_score: 60, min_monthly: 30.0, categories: &["cloud"] },
        TierProfile { tier: TrafficTier::Enterprise, min_score: 100, min_monthly: 100.0, categories: &["cloud", "enterprise"] },
    ];

    static EMPTY_ZONES: &[BlacklistZone] = &[];
    static EMPTY_PORTS: &[SensitivePort] = &[];
    static EMPTY_CMS: &[CmsSignature] = &[];
    static EMPTY_HOSTS: &[HostFingerprint] = &[];

    fn fixture_catalog() -> Arc<ReputationCatalog> {
        Arc::new(ReputationCatalog {
            version: "test",
            blacklist_zones: EMPTY_ZONES,
            sensitive_ports: EMPTY_PORTS,
            cms_signatures: EMPTY_CMS,
            host_fingerprints: EMPTY_HOSTS,
            providers: FIXTURE_PROVIDERS,
            tier_profiles: FIXTURE_TIERS,
            tier_keywords: TierKeywords {
                brand: &[],
                industry: &[],
                premium_tlds: &[],
                marketing: &[],
                analytics: &[],
                commerce: &[],
                cdn_headers: &[],
                security_headers: &[],
            },
        })
    }

    #[test]
    fn enterprise_floor_excludes_cheap_only_providers() {
        let catalog = fixture_catalog();
        let rec = recommended_hosts_for_tier(
            &catalog,
            None,
            TrafficTier::Enterprise,
            &HostingFilters::default(),
        );
        assert!(rec.tier_warning.is_none());
        assert!(rec.hosts.iter().all(|h| h.name != "PennyHost"));
        let iron = rec.hosts.iter().find(|h| h.name == "IronScale").unwrap();
        assert_eq!(iron.recommended_plan.price, 150.0);
        assert_eq!(iron.recommended_plan.name, "Fleet");
    }

    #[test]
    fn floor_relaxation_sets_tier_warning() {
        let catalog = fixture_catalog();
        // Drupal affinity only matches IronScale; a storage demand above its
        // biggest plan forces the floor relaxation path to also come up empty.
        let rec = recommended_hosts_for_tier(
            &catalog,
            Some("Drupal"),
            TrafficTier::Enterprise,
            &HostingFilters {
                min_storage_gb: Some(500),
                ..HostingFilters::default()
            },
        );
        assert!(rec.hosts.is_empty());
        assert!(rec.tier_warning.is_none());

        // With a cheap-only catalog match, the floor relaxes and warns.
        let rec = recommended_hosts_for_tier(
            &catalog,
            Some("WordPress"),
            TrafficTier::Enterprise,
            &HostingFilters {
                min_storage_gb: Some(10),
                region: Some("asia".into()),
                ..HostingFilters::default()
            },
        );
        // Only global PennyHost passes the region filter; it is below the floor.
        assert_eq!(rec.hosts.len(), 1);
        assert_eq!(rec.hosts[0].name, "PennyHost");
        assert!(rec.tier_warning.is_some());
    }

    #[test]
    fn cms_affinity_filters_providers() {
        let catalog = fixture_catalog();
        let rec = recommended_hosts_for_tier(
            &catalog,
            Some("Drupal"),
            TrafficTier::Business,
            &HostingFilters::default(),
        );
        assert_eq!(rec.hosts.len(), 1);
        assert_eq!(rec.hosts[0].name, "IronScale");
        // Business floor is 30: the cheapest qualifying IronScale plan is Entry.
        assert_eq!(rec.hosts[0].recommended_plan.price, 40.0);
    }

    #[test]
    fn feature_overlap_floor_is_seventy_percent() {
        let catalog = fixture_catalog();
        let filters = HostingFilters {
            required_features: vec!["cdn".into(), "scalable".into(), "support-24-7".into()],
            ..HostingFilters::default()
        };
        let rec =
            recommended_hosts_for_tier(&catalog, None, TrafficTier::Business, &filters);
        // MidBox only matches 1 of 3 required features and is excluded.
        assert!(rec.hosts.iter().all(|h| h.name != "MidBox"));
        assert!(rec.hosts.iter().any(|h| h.name == "IronScale"));
    }

    #[test]
    fn priority_bonus_changes_ranking() {
        let catalog = fixture_catalog();
        let base = recommended_hosts_for_tier(
            &catalog,
            None,
            TrafficTier::Business,
            &HostingFilters::default(),
        );
        let with_security = recommended_hosts_for_tier(
            &catalog,
            None,
            TrafficTier::Business,
            &HostingFilters {
                priority: Some(HostingPriority::Security),
                ..HostingFilters::default()
            },
        );
        let base_iron = base.hosts.iter().find(|h| h.name == "IronScale").unwrap();
        let sec_iron = with_security
            .hosts
            .iter()
            .find(|h| h.name == "IronScale")
            .unwrap();
        assert_eq!(sec_iron.match_score, base_iron.match_score + 15);
    }

    #[test]
    fn savings_rank_cheaper_floor_meeting_alternatives() {
        let catalog = fixture_catalog();
        let savings =
            savings_opportunities(&catalog, Some("IronScale"), TrafficTier::Enterprise);
        assert_eq!(savings.len(), 1);
        assert_eq!(savings[0].provider, "MidBox");
        assert_eq!(savings[0].price, 120.0);
        assert_eq!(savings[0].monthly_savings, 30.0);
    }

    #[test]
    fn savings_require_identifiable_current_host() {
        let catalog = fixture_catalog();
        assert!(savings_opportunities(&catalog, None, TrafficTier::Business).is_empty());
        assert!(
            savings_opportunities(&catalog, Some("Unknown Host"), TrafficTier::Business)
                .is_empty()
        );
    }

    #[test]
    fn price_comparison_covers_recommended_plans() {
        let catalog = fixture_catalog();
        let rec = recommended_hosts_for_tier(
            &catalog,
            None,
            TrafficTier::Personal,
            &HostingFilters::default(),
        );
        let cmp = rec.price_comparison.unwrap();
        assert_eq!(cmp.cheapest, 5.0);
        assert!(cmp.most_expensive >= cmp.average);
        assert!(cmp.average >= cmp.cheapest);
    }
}
