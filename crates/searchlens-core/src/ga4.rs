//! Google Analytics 4 payload schemas and the metric extractor.
//!
//! The Data API returns rows of dimension/metric tuples with every
//! metric value encoded as a string. The types here validate and
//! coerce that shape once, at the boundary, so the rest of the crate
//! works with plain numbers. Absent or malformed values coerce to
//! zero; no function in this module returns an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Channel-grouping value that qualifies a row as organic traffic.
/// Compared case-insensitively against the first dimension slot.
pub const ORGANIC_CHANNEL: &str = "organic search";

/// The event being counted as a conversion.
///
/// `TotalEvents` is the "count everything" sentinel the dashboards
/// expose as the default goal. It is a distinct variant, never a
/// string forwarded to the provider as a filter value, so an event
/// that happened to be named "Total Events" cannot be confused with
/// it downstream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversionGoal {
    #[default]
    TotalEvents,
    /// Count only rows whose event-name dimension equals this name
    /// exactly. The match is case-sensitive on purpose: GA4 event
    /// names are caller-defined identifiers, not free text.
    Event(String),
}

impl ConversionGoal {
    pub const TOTAL_EVENTS_LABEL: &'static str = "Total Events";

    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::TotalEvents,
            Some(name) if name == Self::TOTAL_EVENTS_LABEL => Self::TotalEvents,
            Some(name) => Self::Event(name.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::TotalEvents => Self::TOTAL_EVENTS_LABEL,
            Self::Event(name) => name,
        }
    }

    /// Human form for the narrative: snake_case event names become
    /// title case ("sign_up" -> "Sign Up").
    pub fn display_name(&self) -> String {
        match self {
            Self::TotalEvents => Self::TOTAL_EVENTS_LABEL.to_string(),
            Self::Event(name) => name
                .split('_')
                .filter(|word| !word.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => {
                            first.to_uppercase().collect::<String>()
                                + &chars.as_str().to_lowercase()
                        }
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Serialize for ConversionGoal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ConversionGoal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(Some(&raw)))
    }
}

/// One dimension cell of a `runReport` row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionValue {
    #[serde(default)]
    pub value: Option<String>,
}

/// One metric cell of a `runReport` row. The API encodes the number
/// as a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricValue {
    #[serde(default)]
    pub value: Option<String>,
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        self.value
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRow {
    pub dimension_values: Vec<DimensionValue>,
    pub metric_values: Vec<MetricValue>,
}

impl ReportRow {
    pub fn dimension(&self, slot: usize) -> Option<&str> {
        self.dimension_values
            .get(slot)
            .and_then(|cell| cell.value.as_deref())
    }

    pub fn metric(&self, slot: usize) -> f64 {
        self.metric_values
            .get(slot)
            .map(MetricValue::as_f64)
            .unwrap_or(0.0)
    }

    fn is_organic(&self) -> bool {
        self.dimension(0)
            .is_some_and(|value| value.eq_ignore_ascii_case(ORGANIC_CHANNEL))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunReportResponse {
    pub rows: Vec<ReportRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// The per-window bundle assembled by the GA4 provider: one session
/// report keyed by channel grouping, one event report (channel,
/// event name, page path), and an optional product report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ga4Payload {
    pub session_data: RunReportResponse,
    /// Event rows: dimensions are channel grouping / event name /
    /// page path; metrics are event count / revenue / conversions.
    pub rows: Vec<ReportRow>,
    /// Product rows: dimensions are channel grouping / item name /
    /// item id; metrics are views / purchases / revenue. Empty when
    /// e-commerce tracking is absent.
    pub product_data: Vec<ReportRow>,
    pub conversion_goal: ConversionGoal,
}

/// Per-channel slice of the traffic breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    pub sessions: u64,
    pub conversions: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub id: String,
    pub name: String,
    pub views: u64,
    pub purchases: u64,
    pub revenue: f64,
}

/// One period's aggregated GA4 numbers. Constructed once per
/// (property, date-range) payload and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricSnapshot {
    pub sessions: u64,
    pub conversions: u64,
    pub revenue: f64,
    pub conversion_goal: ConversionGoal,
    pub channel_groupings: BTreeMap<String, ChannelMetrics>,
    pub products: Vec<ProductPerformance>,
}

/// Slug a provider channel-grouping label for use as a map key:
/// "Organic Search" -> "organic_search".
pub fn channel_slug(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_sep = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Extract the organic-search snapshot from a GA4 payload.
///
/// Empty or missing row arrays produce an all-zero snapshot with
/// empty product and channel lists.
pub fn extract_snapshot(payload: &Ga4Payload) -> MetricSnapshot {
    let sessions = payload
        .session_data
        .rows
        .iter()
        .filter(|row| row.is_organic())
        .map(|row| row.metric(0))
        .sum::<f64>();

    let organic_rows: Vec<&ReportRow> =
        payload.rows.iter().filter(|row| row.is_organic()).collect();

    let conversions = sum_metric_for_goal(&organic_rows, 0, &payload.conversion_goal);
    let revenue: f64 = organic_rows.iter().map(|row| row.metric(1)).sum();

    let products = payload
        .product_data
        .iter()
        .filter(|row| row.is_organic())
        .map(|row| ProductPerformance {
            name: row.dimension(1).unwrap_or("Unknown Product").to_string(),
            id: row.dimension(2).unwrap_or("").to_string(),
            views: row.metric(0).round() as u64,
            purchases: row.metric(1).round() as u64,
            revenue: row.metric(2),
        })
        .collect();

    MetricSnapshot {
        sessions: sessions.round() as u64,
        conversions: conversions.round() as u64,
        revenue,
        conversion_goal: payload.conversion_goal.clone(),
        channel_groupings: extract_channel_groupings(payload),
        products,
    }
}

/// Per-channel breakdown across every channel present in the session
/// and event reports, not just organic search.
pub fn extract_channel_groupings(payload: &Ga4Payload) -> BTreeMap<String, ChannelMetrics> {
    let mut channels: BTreeMap<String, ChannelMetrics> = BTreeMap::new();

    for row in &payload.session_data.rows {
        let Some(label) = row.dimension(0) else {
            continue;
        };
        let entry = channels.entry(channel_slug(label)).or_default();
        entry.sessions += row.metric(0).round() as u64;
    }

    for row in &payload.rows {
        let Some(label) = row.dimension(0) else {
            continue;
        };
        let entry = channels.entry(channel_slug(label)).or_default();
        if goal_matches(row, &payload.conversion_goal) {
            entry.conversions += row.metric(0).round() as u64;
        }
        entry.revenue += row.metric(1);
    }

    channels
}

fn goal_matches(row: &ReportRow, goal: &ConversionGoal) -> bool {
    match goal {
        ConversionGoal::TotalEvents => true,
        ConversionGoal::Event(name) => row.dimension(1) == Some(name.as_str()),
    }
}

fn sum_metric_for_goal(rows: &[&ReportRow], slot: usize, goal: &ConversionGoal) -> f64 {
    rows.iter()
        .filter(|row| goal_matches(row, goal))
        .map(|row| row.metric(slot))
        .sum()
}
