//! Branded-term classification over Search Console query strings.
//!
//! A term is "branded" when it contains the site's brand name or a
//! recognizable variant of it. The brand variations are derived from
//! the site domain alone; classification is a pure function of
//! (terms, domain).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::change::{pct_change, ZeroRule};
use crate::gsc::SearchTerm;

/// Business words that commonly ride along with a brand in queries
/// ("acme agency", "acme group").
const BUSINESS_SUFFIXES: &[&str] = &[
    "agency",
    "company",
    "inc",
    "llc",
    "ltd",
    "group",
    "services",
    "solutions",
    "consulting",
    "digital",
    "tech",
    "technologies",
    "software",
    "systems",
    "media",
    "marketing",
    "creative",
    "design",
    "web",
    "online",
    "global",
    "international",
    "team",
    "pro",
    "professionals",
    "experts",
];

/// Precomputed brand variations for one site domain.
#[derive(Debug, Clone, Default)]
pub struct BrandMatcher {
    /// Lowercased variations, matched as substrings.
    variations: BTreeSet<String>,
    /// The same variations with non-alphanumerics stripped, matched
    /// against the squashed term ("mybrand" vs "my brand").
    squashed: BTreeSet<String>,
}

impl BrandMatcher {
    /// Build the variation set. `None` (site domain unknown) yields a
    /// matcher that classifies nothing as branded.
    pub fn from_domain(domain: Option<&str>) -> Self {
        let Some(domain) = domain.map(str::trim).filter(|d| !d.is_empty()) else {
            return Self::default();
        };

        let token = base_brand_token(domain);
        if token.is_empty() {
            return Self::default();
        }

        let mut variations: BTreeSet<String> = BTreeSet::new();
        variations.insert(token.to_lowercase());

        let parts: Vec<String> = split_brand_parts(&token)
            .into_iter()
            .filter(|part| part.len() >= 2)
            .collect();

        for part in &parts {
            variations.insert(part.clone());
            for suffix in BUSINESS_SUFFIXES {
                variations.insert(format!("{part} {suffix}"));
                variations.insert(format!("{suffix} {part}"));
            }
        }
        for pair in parts.windows(2) {
            variations.insert(format!("{}{}", pair[0], pair[1]));
        }

        let squashed = variations.iter().map(|v| squash(v)).collect();
        Self {
            variations,
            squashed,
        }
    }

    pub fn is_branded(&self, term: &str) -> bool {
        if self.variations.is_empty() {
            return false;
        }
        let normalized = term.to_lowercase();
        if self.variations.iter().any(|v| normalized.contains(v)) {
            return true;
        }
        let squashed_term = squash(&normalized);
        self.squashed
            .iter()
            .any(|v| !v.is_empty() && squashed_term.contains(v))
    }
}

/// Strip scheme and `www.` from the domain and take the label before
/// the first dot. Case is preserved so camel-cased brand names keep
/// their word boundaries for tokenization.
fn base_brand_token(domain: &str) -> String {
    let without_scheme = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    let without_www = without_scheme
        .strip_prefix("www.")
        .or_else(|| without_scheme.strip_prefix("WWW."))
        .unwrap_or(without_scheme);
    without_www
        .split('.')
        .next()
        .unwrap_or("")
        .trim_matches('/')
        .to_string()
}

/// Break a brand token into words at camel-case transitions and
/// non-alphanumeric runs: "MyBrand-42" -> ["my", "brand", "42"].
fn split_brand_parts(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_was_lower = false;

    for ch in token.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() && prev_was_lower && !current.is_empty() {
                parts.push(current.to_lowercase());
                current = String::new();
            }
            prev_was_lower = ch.is_lowercase();
            current.push(ch);
        } else {
            if !current.is_empty() {
                parts.push(current.to_lowercase());
                current = String::new();
            }
            prev_was_lower = false;
        }
    }
    if !current.is_empty() {
        parts.push(current.to_lowercase());
    }
    parts
}

fn squash(value: &str) -> String {
    value.chars().filter(|ch| ch.is_alphanumeric()).collect()
}

/// One side of the branded/non-branded split.
#[derive(Debug, Clone, Serialize)]
pub struct BrandedPartition {
    pub terms: Vec<SearchTerm>,
    pub clicks: u64,
    /// Share of total clicks across both partitions, 0-100.
    pub percentage: f64,
    /// Click change vs the previous period, percent.
    pub change: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandedSplit {
    pub branded: BrandedPartition,
    pub non_branded: BrandedPartition,
}

/// Partition a term list into branded and non-branded buckets and
/// aggregate click totals, shares, and click changes per bucket.
pub fn analyze_branded_terms(terms: &[SearchTerm], domain: Option<&str>) -> BrandedSplit {
    let matcher = BrandMatcher::from_domain(domain);

    let (branded, non_branded): (Vec<SearchTerm>, Vec<SearchTerm>) = terms
        .iter()
        .cloned()
        .partition(|term| matcher.is_branded(&term.term));

    let total_clicks = clicks_of(&branded) + clicks_of(&non_branded);
    BrandedSplit {
        branded: partition_of(branded, total_clicks),
        non_branded: partition_of(non_branded, total_clicks),
    }
}

fn clicks_of(terms: &[SearchTerm]) -> u64 {
    terms.iter().map(|term| term.current.clicks).sum()
}

fn partition_of(terms: Vec<SearchTerm>, total_clicks: u64) -> BrandedPartition {
    let clicks = clicks_of(&terms);
    let prev_clicks: u64 = terms.iter().map(|term| term.previous.clicks).sum();
    BrandedPartition {
        percentage: if total_clicks == 0 {
            0.0
        } else {
            clicks as f64 / total_clicks as f64 * 100.0
        },
        change: pct_change(clicks as f64, prev_clicks as f64, ZeroRule::Flat),
        clicks,
        terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsc::{TermChanges, TermWindow};

    fn term(text: &str, clicks: u64, prev_clicks: u64) -> SearchTerm {
        SearchTerm {
            term: text.to_string(),
            current: TermWindow {
                clicks,
                ..TermWindow::default()
            },
            previous: TermWindow {
                clicks: prev_clicks,
                ..TermWindow::default()
            },
            changes: TermChanges::default(),
        }
    }

    #[test]
    fn classifies_brand_and_variants() {
        let matcher = BrandMatcher::from_domain(Some("acme.com"));
        assert!(matcher.is_branded("acme shoes"));
        assert!(matcher.is_branded("acmeshoes"));
        assert!(matcher.is_branded("ACME discount code"));
        assert!(!matcher.is_branded("best running shoes"));
    }

    #[test]
    fn no_domain_classifies_nothing() {
        let matcher = BrandMatcher::from_domain(None);
        assert!(!matcher.is_branded("acme shoes"));
    }

    #[test]
    fn camel_case_domain_splits_into_words() {
        let matcher = BrandMatcher::from_domain(Some("TrailForge.io"));
        assert!(matcher.is_branded("trail forge boots"));
        assert!(matcher.is_branded("trailforge review"));
    }

    #[test]
    fn squashed_match_bridges_whitespace() {
        // "my brand" in the query matches the "mybrand" token even
        // though the domain has no space.
        let matcher = BrandMatcher::from_domain(Some("https://www.mybrand.com"));
        assert!(matcher.is_branded("my brand reviews"));
    }

    #[test]
    fn business_suffix_combinations_are_branded() {
        let matcher = BrandMatcher::from_domain(Some("acme.com"));
        assert!(matcher.is_branded("acme agency pricing"));
    }

    #[test]
    fn partition_is_complete() {
        let terms = vec![
            term("acme shoes", 60, 40),
            term("best running shoes", 30, 30),
            term("acmeshoes", 10, 0),
        ];
        let split = analyze_branded_terms(&terms, Some("acme.com"));

        assert_eq!(
            split.branded.terms.len() + split.non_branded.terms.len(),
            terms.len()
        );
        assert_eq!(split.branded.terms.len(), 2);
        assert_eq!(split.branded.clicks + split.non_branded.clicks, 100);
    }

    #[test]
    fn percentages_close_to_hundred() {
        let terms = vec![term("acme shoes", 70, 0), term("running shoes", 30, 0)];
        let split = analyze_branded_terms(&terms, Some("acme.com"));
        let total = split.branded.percentage + split.non_branded.percentage;
        assert!((total - 100.0).abs() < 0.01);
    }

    #[test]
    fn zero_clicks_yield_zero_percentages() {
        let terms = vec![term("acme shoes", 0, 0), term("running shoes", 0, 0)];
        let split = analyze_branded_terms(&terms, Some("acme.com"));
        assert_eq!(split.branded.percentage, 0.0);
        assert_eq!(split.non_branded.percentage, 0.0);
    }

    #[test]
    fn partition_change_uses_flat_zero_rule() {
        // Branded clicks went 0 -> 10; the partition-level convention
        // reports that as flat, not +100%.
        let terms = vec![term("acme shoes", 10, 0)];
        let split = analyze_branded_terms(&terms, Some("acme.com"));
        assert_eq!(split.branded.change, 0.0);
    }
}
