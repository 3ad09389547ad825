//! Search Console payload schemas, the search snapshot, and the
//! current/previous term join.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::change::{pct_change, ZeroRule};
use crate::format::pct_string;

/// One row of a Search Analytics query response. `keys` holds the
/// requested dimension values (the query string or page URL).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GscRow {
    pub keys: Vec<String>,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

impl GscRow {
    pub fn key(&self) -> Option<&str> {
        self.keys.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchAnalyticsResponse {
    pub rows: Vec<GscRow>,
}

/// One period's Search Console aggregate.
///
/// `ctr` is taken from the provider's single aggregate row, which
/// averages per-row CTR rather than recomputing clicks/impressions.
/// A known approximation, carried over unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub clicks: u64,
    pub impressions: u64,
    /// Fraction in [0, 1].
    pub ctr: f64,
    /// Average rank; lower is better.
    pub position: f64,
}

/// Aggregate snapshot from a dimensionless query (one row).
/// Missing rows produce an all-zero snapshot.
pub fn extract_snapshot(data: &SearchAnalyticsResponse) -> SearchSnapshot {
    match data.rows.first() {
        Some(row) => SearchSnapshot {
            clicks: row.clicks.round() as u64,
            impressions: row.impressions.round() as u64,
            ctr: row.ctr,
            position: row.position,
        },
        None => SearchSnapshot::default(),
    }
}

/// One side (current or previous) of a term comparison. CTR is a
/// percentage and position a rank, both pre-rendered the way the
/// term tables display them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWindow {
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: String,
    pub position: String,
}

impl Default for TermWindow {
    fn default() -> Self {
        Self {
            clicks: 0,
            impressions: 0,
            ctr: "0".to_string(),
            position: "0".to_string(),
        }
    }
}

/// Signed percentage changes, one decimal place, as rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermChanges {
    pub clicks: String,
    pub impressions: String,
    pub ctr: String,
    pub position: String,
}

/// One query string's current/previous/changes triple. The same shape
/// is used for the page table, keyed by page URL instead of query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTerm {
    pub term: String,
    pub current: TermWindow,
    pub previous: TermWindow,
    pub changes: TermChanges,
}

/// Join the current period's term report against the previous one.
///
/// Terms absent from the previous period compare against zeros, so
/// their click change reports +100% (the term-table convention).
pub fn combine_term_reports(
    current: &SearchAnalyticsResponse,
    previous: &SearchAnalyticsResponse,
) -> Vec<SearchTerm> {
    current
        .rows
        .iter()
        .filter_map(|row| {
            let term = row.key()?.to_string();
            let prev_row = previous.rows.iter().find(|prev| prev.key() == row.key());

            let prev_window = match prev_row {
                Some(prev) => TermWindow {
                    clicks: prev.clicks.round() as u64,
                    impressions: prev.impressions.round() as u64,
                    ctr: format!("{:.2}", prev.ctr * 100.0),
                    position: format!("{:.1}", prev.position),
                },
                None => TermWindow::default(),
            };

            let zeros = GscRow::default();
            let prev = prev_row.unwrap_or(&zeros);

            Some(SearchTerm {
                term,
                current: TermWindow {
                    clicks: row.clicks.round() as u64,
                    impressions: row.impressions.round() as u64,
                    ctr: format!("{:.2}", row.ctr * 100.0),
                    position: format!("{:.1}", row.position),
                },
                previous: prev_window,
                changes: TermChanges {
                    clicks: pct_string(pct_change(row.clicks, prev.clicks, ZeroRule::FullGain)),
                    impressions: pct_string(pct_change(
                        row.impressions,
                        prev.impressions,
                        ZeroRule::FullGain,
                    )),
                    ctr: pct_string(pct_change(row.ctr, prev.ctr, ZeroRule::FullGain)),
                    position: pct_string(pct_change(
                        row.position,
                        prev.position,
                        ZeroRule::FullGain,
                    )),
                },
            })
        })
        .collect()
}

/// Site domain from a Search Console property identifier:
/// `"sc-domain:example.com"` or `"https://www.example.com/"` both
/// yield `"example.com"`.
pub fn site_domain(property: &str) -> String {
    let trimmed = property.trim();
    let rest = trimmed.strip_prefix("sc-domain:").unwrap_or(trimmed);
    let host = Url::parse(rest)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| rest.trim_end_matches('/').to_string());
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, clicks: f64, impressions: f64, ctr: f64, position: f64) -> GscRow {
        GscRow {
            keys: vec![key.to_string()],
            clicks,
            impressions,
            ctr,
            position,
        }
    }

    #[test]
    fn snapshot_from_aggregate_row() {
        let data = SearchAnalyticsResponse {
            rows: vec![row("", 1200.0, 48000.0, 0.025, 12.4)],
        };
        let snapshot = extract_snapshot(&data);
        assert_eq!(snapshot.clicks, 1200);
        assert_eq!(snapshot.impressions, 48000);
        assert!((snapshot.ctr - 0.025).abs() < 1e-9);
    }

    #[test]
    fn snapshot_from_empty_response_is_zeroed() {
        let snapshot = extract_snapshot(&SearchAnalyticsResponse::default());
        assert_eq!(snapshot.clicks, 0);
        assert_eq!(snapshot.position, 0.0);
    }

    #[test]
    fn term_join_matches_previous_by_key() {
        let current = SearchAnalyticsResponse {
            rows: vec![row("acme shoes", 60.0, 900.0, 0.066, 3.2)],
        };
        let previous = SearchAnalyticsResponse {
            rows: vec![row("acme shoes", 40.0, 800.0, 0.05, 4.0)],
        };

        let terms = combine_term_reports(&current, &previous);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].current.clicks, 60);
        assert_eq!(terms[0].previous.clicks, 40);
        assert_eq!(terms[0].changes.clicks, "50.0");
    }

    #[test]
    fn term_missing_from_previous_period_reports_full_gain() {
        let current = SearchAnalyticsResponse {
            rows: vec![row("new query", 12.0, 150.0, 0.08, 6.0)],
        };
        let terms = combine_term_reports(&current, &SearchAnalyticsResponse::default());
        assert_eq!(terms[0].previous.clicks, 0);
        assert_eq!(terms[0].changes.clicks, "100.0");
        assert_eq!(terms[0].previous.ctr, "0");
    }

    #[test]
    fn term_flat_when_both_periods_zero() {
        let current = SearchAnalyticsResponse {
            rows: vec![row("quiet query", 0.0, 10.0, 0.0, 40.0)],
        };
        let terms = combine_term_reports(&current, &SearchAnalyticsResponse::default());
        assert_eq!(terms[0].changes.clicks, "0.0");
    }

    #[test]
    fn site_domain_strips_decorations() {
        assert_eq!(site_domain("sc-domain:example.com"), "example.com");
        assert_eq!(site_domain("https://www.example.com/"), "example.com");
        assert_eq!(site_domain("http://example.com"), "example.com");
        assert_eq!(site_domain("example.com"), "example.com");
    }
}
