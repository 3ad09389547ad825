//! Period windows and the report assembler.
//!
//! Everything here is a pure transformation over already-fetched
//! payloads: date math runs over an injected `today`, and the caller
//! passes an explicit request context and receives the report as the
//! return value.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::change::{pct_change, position_delta, ZeroRule};
use crate::ga4::{self, ChannelMetrics, ConversionGoal, Ga4Payload, ProductPerformance};
use crate::gsc::{self, SearchAnalyticsResponse, SearchSnapshot, SearchTerm};
use crate::summary::generate_summary;

/// The five fixed comparison windows, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodWindow {
    Weekly,
    Monthly,
    Quarterly,
    YearToDate,
    Last28DayYoy,
}

impl PeriodWindow {
    pub const ALL: [PeriodWindow; 5] = [
        PeriodWindow::Weekly,
        PeriodWindow::Monthly,
        PeriodWindow::Quarterly,
        PeriodWindow::YearToDate,
        PeriodWindow::Last28DayYoy,
    ];

    /// Current and previous date ranges for this window, anchored at
    /// `today`. Total over any input date.
    pub fn ranges(self, today: NaiveDate) -> WindowRanges {
        match self {
            PeriodWindow::Weekly => {
                let current = DateRange::ending(today, 7);
                let previous = current.preceding();
                WindowRanges { current, previous }
            }
            PeriodWindow::Monthly => Self::months_window(today, 1),
            PeriodWindow::Quarterly => Self::months_window(today, 3),
            PeriodWindow::YearToDate => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let current = DateRange { start, end: today };
                let previous = current.year_earlier();
                WindowRanges { current, previous }
            }
            PeriodWindow::Last28DayYoy => {
                let current = DateRange::ending(today, 28);
                let previous = current.year_earlier();
                WindowRanges { current, previous }
            }
        }
    }

    fn months_window(today: NaiveDate, span: u32) -> WindowRanges {
        let current = DateRange {
            start: months_back(today, span),
            end: today,
        };
        let previous = DateRange {
            start: months_back(today, span * 2),
            end: current.start - Duration::days(1),
        };
        WindowRanges { current, previous }
    }
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days`-long range ending at `end` inclusive.
    pub fn ending(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days - 1),
            end,
        }
    }

    /// The same-length range immediately before this one.
    pub fn preceding(&self) -> Self {
        let days = (self.end - self.start).num_days() + 1;
        let end = self.start - Duration::days(1);
        Self {
            start: end - Duration::days(days - 1),
            end,
        }
    }

    /// This range shifted back 365 days.
    pub fn year_earlier(&self) -> Self {
        Self {
            start: self.start - Duration::days(365),
            end: self.end - Duration::days(365),
        }
    }

    pub fn label(&self) -> String {
        format!("{} to {}", label_date(self.start), label_date(self.end))
    }
}

fn label_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindowRanges {
    pub current: DateRange,
    pub previous: DateRange,
}

impl WindowRanges {
    /// Human label: "Mar 9, 2026 to Mar 15, 2026 vs Mar 2, 2026 to
    /// Mar 8, 2026".
    pub fn label(&self) -> String {
        format!("{} vs {}", self.current.label(), self.previous.label())
    }
}

/// Merged GA4 + Search Console numbers for one period. Search
/// Console fields are absent (not zeroed) when that source returned
/// no data for the period.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub sessions: u64,
    pub conversions: u64,
    pub revenue: f64,
    pub conversion_goal: ConversionGoal,
    pub channel_groupings: BTreeMap<String, ChannelMetrics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductPerformance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

impl PeriodMetrics {
    pub fn merge(ga4: ga4::MetricSnapshot, search: Option<SearchSnapshot>) -> Self {
        Self {
            sessions: ga4.sessions,
            conversions: ga4.conversions,
            revenue: ga4.revenue,
            conversion_goal: ga4.conversion_goal,
            channel_groupings: ga4.channel_groupings,
            products: ga4.products,
            clicks: search.as_ref().map(|s| s.clicks),
            impressions: search.as_ref().map(|s| s.impressions),
            ctr: search.as_ref().map(|s| s.ctr),
            position: search.as_ref().map(|s| s.position),
        }
    }
}

/// Field-by-field changes. GA4 fields are always present; Search
/// Console fields appear only when both periods had data. Absent
/// sources are omitted, never fabricated.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChanges {
    pub sessions: f64,
    pub conversions: f64,
    pub revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    /// Inverted rank delta; positive means the position improved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

impl MetricChanges {
    pub fn between(current: &PeriodMetrics, previous: &PeriodMetrics) -> Self {
        let gsc_pair = |cur: Option<u64>, prev: Option<u64>| match (cur, prev) {
            (Some(cur), Some(prev)) => {
                Some(pct_change(cur as f64, prev as f64, ZeroRule::Flat))
            }
            _ => None,
        };
        Self {
            sessions: pct_change(
                current.sessions as f64,
                previous.sessions as f64,
                ZeroRule::Flat,
            ),
            conversions: pct_change(
                current.conversions as f64,
                previous.conversions as f64,
                ZeroRule::Flat,
            ),
            revenue: pct_change(current.revenue, previous.revenue, ZeroRule::Flat),
            clicks: gsc_pair(current.clicks, previous.clicks),
            impressions: gsc_pair(current.impressions, previous.impressions),
            ctr: match (current.ctr, previous.ctr) {
                (Some(cur), Some(prev)) => Some(pct_change(cur, prev, ZeroRule::Flat)),
                _ => None,
            },
            position: match (current.position, previous.position) {
                (Some(cur), Some(prev)) => Some(position_delta(cur, prev)),
                _ => None,
            },
        }
    }
}

/// Which sources actually contributed data to a window.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DataSources {
    pub ga4: bool,
    pub gsc: bool,
}

/// Raw per-window material handed to the assembler. Any piece may be
/// absent; the analysis degrades rather than failing.
#[derive(Debug, Clone, Default)]
pub struct PeriodInputs {
    pub current_ga4: Option<Ga4Payload>,
    pub previous_ga4: Option<Ga4Payload>,
    pub current_gsc: Option<SearchAnalyticsResponse>,
    pub previous_gsc: Option<SearchAnalyticsResponse>,
    pub search_terms: Option<Vec<SearchTerm>>,
    pub pages: Option<Vec<SearchTerm>>,
    pub domain: Option<String>,
}

/// One comparison window's analysis, ready for rendering or export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAnalysis {
    pub period: String,
    pub current: PeriodMetrics,
    pub previous: PeriodMetrics,
    pub changes: MetricChanges,
    pub summary: String,
    pub data_sources: DataSources,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<Vec<SearchTerm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<SearchTerm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Analyze one comparison window. Total over its inputs: missing
/// payloads degrade to zeroed metrics and omitted fields.
pub fn analyze_period(ranges: &WindowRanges, inputs: &PeriodInputs) -> PeriodAnalysis {
    let current_snapshot = inputs
        .current_ga4
        .as_ref()
        .map(ga4::extract_snapshot)
        .unwrap_or_default();
    let previous_snapshot = inputs
        .previous_ga4
        .as_ref()
        .map(ga4::extract_snapshot)
        .unwrap_or_default();

    let current = PeriodMetrics::merge(
        current_snapshot,
        inputs.current_gsc.as_ref().map(gsc::extract_snapshot),
    );
    let previous = PeriodMetrics::merge(
        previous_snapshot,
        inputs.previous_gsc.as_ref().map(gsc::extract_snapshot),
    );

    let changes = MetricChanges::between(&current, &previous);
    let period = ranges.label();
    let summary = generate_summary(&changes, &current, &previous, &period);

    PeriodAnalysis {
        period,
        summary,
        changes,
        data_sources: DataSources {
            ga4: inputs.current_ga4.is_some(),
            gsc: inputs.current_gsc.is_some(),
        },
        current,
        previous,
        search_terms: inputs.search_terms.clone(),
        pages: inputs.pages.clone(),
        domain: inputs.domain.clone(),
    }
}

/// The five-window report envelope. Field order is the fixed window
/// order; a window whose data could not be fetched is `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_analysis: Option<PeriodAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_analysis: Option<PeriodAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarterly_analysis: Option<PeriodAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd_analysis: Option<PeriodAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last28_yoy_analysis: Option<PeriodAnalysis>,
}

impl AnalysisReport {
    pub fn set(&mut self, window: PeriodWindow, analysis: Option<PeriodAnalysis>) {
        match window {
            PeriodWindow::Weekly => self.weekly_analysis = analysis,
            PeriodWindow::Monthly => self.monthly_analysis = analysis,
            PeriodWindow::Quarterly => self.quarterly_analysis = analysis,
            PeriodWindow::YearToDate => self.ytd_analysis = analysis,
            PeriodWindow::Last28DayYoy => self.last28_yoy_analysis = analysis,
        }
    }
}

/// The analyze-request context: everything the assembly of one report
/// needs, passed explicitly by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub ga4_property: String,
    #[serde(default)]
    pub gsc_property: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub main_conversion_goal: Option<String>,
}

impl ReportRequest {
    pub fn conversion_goal(&self) -> ConversionGoal {
        ConversionGoal::parse(self.main_conversion_goal.as_deref())
    }

    /// Site domain for branded-term classification, when a Search
    /// Console property was selected.
    pub fn domain(&self) -> Option<String> {
        self.gsc_property
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(gsc::site_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga4::{DimensionValue, MetricValue, ReportRow, RunReportResponse};
    use crate::gsc::GscRow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn session_row(channel: &str, sessions: &str) -> ReportRow {
        ReportRow {
            dimension_values: vec![DimensionValue {
                value: Some(channel.to_string()),
            }],
            metric_values: vec![MetricValue {
                value: Some(sessions.to_string()),
            }],
        }
    }

    fn ga4_with_sessions(sessions: &str) -> Ga4Payload {
        Ga4Payload {
            session_data: RunReportResponse {
                rows: vec![session_row("Organic Search", sessions)],
                row_count: None,
            },
            ..Ga4Payload::default()
        }
    }

    #[test]
    fn weekly_window_spans_seven_days_each() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        assert_eq!(ranges.current.start, date(2026, 3, 9));
        assert_eq!(ranges.current.end, date(2026, 3, 15));
        assert_eq!(ranges.previous.start, date(2026, 3, 2));
        assert_eq!(ranges.previous.end, date(2026, 3, 8));
    }

    #[test]
    fn monthly_window_backs_off_whole_months() {
        let ranges = PeriodWindow::Monthly.ranges(date(2026, 3, 15));
        assert_eq!(ranges.current.start, date(2026, 2, 15));
        assert_eq!(ranges.current.end, date(2026, 3, 15));
        assert_eq!(ranges.previous.start, date(2026, 1, 15));
        assert_eq!(ranges.previous.end, date(2026, 2, 14));
    }

    #[test]
    fn ytd_window_compares_against_prior_year() {
        let ranges = PeriodWindow::YearToDate.ranges(date(2026, 3, 15));
        assert_eq!(ranges.current.start, date(2026, 1, 1));
        assert_eq!(ranges.previous.start, date(2025, 1, 1));
        assert_eq!(ranges.previous.end, date(2025, 3, 15));
    }

    #[test]
    fn last28_yoy_window_shifts_a_year_back() {
        let ranges = PeriodWindow::Last28DayYoy.ranges(date(2026, 3, 15));
        assert_eq!(ranges.current.start, date(2026, 2, 16));
        assert_eq!(ranges.previous.start, date(2025, 2, 16));
        assert_eq!(ranges.previous.end, date(2025, 3, 15));
    }

    #[test]
    fn window_label_is_human_readable() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        assert_eq!(
            ranges.label(),
            "Mar 9, 2026 to Mar 15, 2026 vs Mar 2, 2026 to Mar 8, 2026"
        );
    }

    #[test]
    fn missing_previous_period_keeps_changes_finite() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        let inputs = PeriodInputs {
            current_ga4: Some(ga4_with_sessions("120")),
            current_gsc: Some(SearchAnalyticsResponse {
                rows: vec![GscRow {
                    keys: vec![],
                    clicks: 40.0,
                    impressions: 900.0,
                    ctr: 0.044,
                    position: 8.1,
                }],
            }),
            ..PeriodInputs::default()
        };

        let analysis = analyze_period(&ranges, &inputs);
        assert!(analysis.changes.sessions.is_finite());
        assert_eq!(analysis.changes.sessions, 0.0);
        // Previous period had no GSC data, so GSC changes are omitted
        // rather than fabricated.
        assert!(analysis.changes.clicks.is_none());
        assert!(analysis.changes.position.is_none());
    }

    #[test]
    fn data_source_flags_reflect_present_payloads() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        let inputs = PeriodInputs {
            current_ga4: Some(ga4_with_sessions("10")),
            ..PeriodInputs::default()
        };
        let analysis = analyze_period(&ranges, &inputs);
        assert!(analysis.data_sources.ga4);
        assert!(!analysis.data_sources.gsc);
        assert!(analysis.current.clicks.is_none());
    }

    #[test]
    fn period_changes_use_flat_zero_rule() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        let inputs = PeriodInputs {
            current_ga4: Some(ga4_with_sessions("50")),
            previous_ga4: Some(ga4_with_sessions("0")),
            ..PeriodInputs::default()
        };
        // Snapshot-level convention: growth from zero is flat.
        assert_eq!(analyze_period(&ranges, &inputs).changes.sessions, 0.0);
    }

    #[test]
    fn sessions_change_computed_between_periods() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        let inputs = PeriodInputs {
            current_ga4: Some(ga4_with_sessions("120")),
            previous_ga4: Some(ga4_with_sessions("100")),
            ..PeriodInputs::default()
        };
        let analysis = analyze_period(&ranges, &inputs);
        assert!((analysis.changes.sessions - 20.0).abs() < 1e-9);
        assert!(analysis.summary.contains("sessions"));
    }

    #[test]
    fn report_serializes_with_window_keys() {
        let ranges = PeriodWindow::Weekly.ranges(date(2026, 3, 15));
        let mut report = AnalysisReport::default();
        report.set(
            PeriodWindow::Weekly,
            Some(analyze_period(&ranges, &PeriodInputs::default())),
        );

        let value = serde_json::to_value(&report).expect("serialize");
        assert!(value.get("weekly_analysis").is_some());
        assert!(value.get("monthly_analysis").is_none());
        let weekly = &value["weekly_analysis"];
        assert!(weekly.get("dataSources").is_some());
        assert!(weekly.get("changes").is_some());
    }

    #[test]
    fn report_request_derives_goal_and_domain() {
        let request = ReportRequest {
            ga4_property: "properties/123".to_string(),
            gsc_property: Some("https://www.acme.com/".to_string()),
            access_token: "token".to_string(),
            main_conversion_goal: Some("sign_up".to_string()),
        };
        assert_eq!(
            request.conversion_goal(),
            ConversionGoal::Event("sign_up".to_string())
        );
        assert_eq!(request.domain().as_deref(), Some("acme.com"));
    }
}
