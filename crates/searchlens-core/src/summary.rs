//! Deterministic narrative generation for one comparison window.
//!
//! This is plain text templating over the computed changes, distinct
//! from the LLM-backed insights call, which lives outside this crate.

use crate::change::{pct_change, ZeroRule};
use crate::format::{group_thousands, money};
use crate::ga4::ChannelMetrics;
use crate::report::{MetricChanges, PeriodMetrics};

/// Render the fixed-order narrative paragraph for a window.
///
/// Sections for conversions, revenue, and Search Console are emitted
/// only when their data is present; nothing is replaced with
/// placeholder text.
pub fn generate_summary(
    changes: &MetricChanges,
    current: &PeriodMetrics,
    previous: &PeriodMetrics,
    period_label: &str,
) -> String {
    let mut summary = format!("{period_label} Performance Analysis:\n\n");

    // Pure organic-search reports swap in channel-level numbers and a
    // channel-specific sentence prefix.
    let organic = organic_only(current).zip(organic_only(previous));
    let (prefix, sessions, conversions, revenue, section_changes) = match &organic {
        Some((cur, prev)) => (
            "Organic search",
            (cur.sessions, prev.sessions),
            (cur.conversions, prev.conversions),
            (cur.revenue, prev.revenue),
            MetricChanges {
                sessions: pct_change(cur.sessions as f64, prev.sessions as f64, ZeroRule::Flat),
                conversions: pct_change(
                    cur.conversions as f64,
                    prev.conversions as f64,
                    ZeroRule::Flat,
                ),
                revenue: pct_change(cur.revenue, prev.revenue, ZeroRule::Flat),
                ..MetricChanges::default()
            },
        ),
        None => (
            "Total",
            (current.sessions, previous.sessions),
            (current.conversions, previous.conversions),
            (current.revenue, previous.revenue),
            changes.clone(),
        ),
    };

    summary.push_str("Traffic and Engagement:\n");
    summary.push_str(&format!(
        "{prefix} sessions {} from {} to {}. ",
        describe_change(section_changes.sessions, true),
        group_thousands(sessions.1),
        group_thousands(sessions.0),
    ));

    if conversions.0 > 0 {
        summary.push_str(&format!(
            "\n\nConversions:\n{prefix} {} {} from {} to {}. ",
            current.conversion_goal.display_name(),
            describe_change(section_changes.conversions, true),
            group_thousands(conversions.1),
            group_thousands(conversions.0),
        ));
    }

    if revenue.0 > 0.0 {
        summary.push_str(&format!(
            "\n\nRevenue:\n{prefix} revenue {} from ${} to ${}. ",
            describe_change(section_changes.revenue, true),
            money(revenue.1),
            money(revenue.0),
        ));
    }

    if let Some(gsc) = search_console_section(changes, current, previous) {
        summary.push_str(&gsc);
    }

    summary
}

/// The organic-search channel slice, only for the pure-organic case:
/// exactly one channel grouping and it is organic search.
fn organic_only(metrics: &PeriodMetrics) -> Option<&ChannelMetrics> {
    if metrics.channel_groupings.len() == 1 {
        metrics.channel_groupings.get("organic_search")
    } else {
        None
    }
}

fn search_console_section(
    changes: &MetricChanges,
    current: &PeriodMetrics,
    previous: &PeriodMetrics,
) -> Option<String> {
    // Both periods must have Search Console data.
    let (cur_clicks, prev_clicks) = current.clicks.zip(previous.clicks)?;
    let (cur_impressions, prev_impressions) = current.impressions.zip(previous.impressions)?;

    let mut section = "\n\nSearch Console Performance:\n".to_string();
    section.push_str(&format!(
        "Clicks {} from {} to {}. ",
        describe_change(changes.clicks.unwrap_or(0.0), true),
        group_thousands(prev_clicks),
        group_thousands(cur_clicks),
    ));
    section.push_str(&format!(
        "Impressions {} from {} to {}. ",
        describe_change(changes.impressions.unwrap_or(0.0), true),
        group_thousands(prev_impressions),
        group_thousands(cur_impressions),
    ));

    if let (Some(ctr), Some(ctr_change)) = (current.ctr, changes.ctr) {
        section.push_str(&format!(
            "The click-through rate (CTR) {} to {:.1}%. ",
            describe_change(ctr_change, true),
            ctr * 100.0,
        ));
    }

    if let (Some(position), Some(delta)) = (current.position, changes.position) {
        section.push_str(&format!(
            "The average position {} to {position:.1}. ",
            describe_position(delta),
        ));
    }

    Some(section)
}

/// "increased by 12.5% (improved)", "decreased by 3.1% (declined)",
/// or "remained stable" for a zero change.
fn describe_change(change: f64, higher_is_better: bool) -> String {
    if change == 0.0 || !change.is_finite() {
        return "remained stable".to_string();
    }
    let direction = if change > 0.0 { "increased" } else { "decreased" };
    let good = if higher_is_better {
        change > 0.0
    } else {
        change < 0.0
    };
    let verdict = if good { "improved" } else { "declined" };
    format!("{direction} by {:.1}% ({verdict})", change.abs())
}

/// Position deltas are already inverted: positive means better rank.
fn describe_position(delta: f64) -> String {
    if delta == 0.0 {
        return "remained stable".to_string();
    }
    let verdict = if delta > 0.0 { "improved" } else { "declined" };
    format!("{verdict} by {:.1}", delta.abs())
}
