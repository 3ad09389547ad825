use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use searchlens_core::ga4::{ConversionGoal, Ga4Payload};
use searchlens_core::gsc::combine_term_reports;
use searchlens_core::provider::GoogleDataProvider;
use searchlens_core::report::{
    analyze_period, AnalysisReport, PeriodAnalysis, PeriodInputs, PeriodWindow, ReportRequest,
};

use crate::{error::AppError, state::AppState};

/// `POST /api/analyze` - fetch and compare all five period windows,
/// returning the assembled report.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.ga4_property.trim().is_empty() || request.access_token.trim().is_empty() {
        return Err(AppError::BadRequest(
            "ga4Property and accessToken are required".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let report = build_report(state.provider.as_ref(), &request, today).await;

    Ok(Json(json!({
        "id": Uuid::new_v4().to_string(),
        "ranAt": Utc::now().to_rfc3339(),
        "report": report,
    })))
}

/// Fetch and analyze the five windows concurrently. Windows are
/// independent: one window's provider failures never abort the
/// others.
pub async fn build_report(
    provider: &dyn GoogleDataProvider,
    request: &ReportRequest,
    today: NaiveDate,
) -> AnalysisReport {
    let (weekly, monthly, quarterly, ytd, last28) = tokio::join!(
        fetch_window(provider, request, PeriodWindow::Weekly, today),
        fetch_window(provider, request, PeriodWindow::Monthly, today),
        fetch_window(provider, request, PeriodWindow::Quarterly, today),
        fetch_window(provider, request, PeriodWindow::YearToDate, today),
        fetch_window(provider, request, PeriodWindow::Last28DayYoy, today),
    );

    let mut report = AnalysisReport::default();
    report.set(PeriodWindow::Weekly, weekly);
    report.set(PeriodWindow::Monthly, monthly);
    report.set(PeriodWindow::Quarterly, quarterly);
    report.set(PeriodWindow::YearToDate, ytd);
    report.set(PeriodWindow::Last28DayYoy, last28);
    report
}

/// Fetch one window's material and run the assembler over it. Every
/// provider failure degrades to an absent piece; the window itself is
/// omitted only when no source returned anything.
async fn fetch_window(
    provider: &dyn GoogleDataProvider,
    request: &ReportRequest,
    window: PeriodWindow,
    today: NaiveDate,
) -> Option<PeriodAnalysis> {
    let ranges = window.ranges(today);
    let goal = request.conversion_goal();
    let token = request.access_token.as_str();

    let (current_ga4, previous_ga4) = tokio::join!(
        fetch_ga4(provider, request, token, &ranges.current, &goal, window),
        fetch_ga4(provider, request, token, &ranges.previous, &goal, window),
    );

    let mut inputs = PeriodInputs {
        current_ga4,
        previous_ga4,
        domain: request.domain(),
        ..PeriodInputs::default()
    };

    let site = request
        .gsc_property
        .as_deref()
        .map(str::trim)
        .filter(|site| !site.is_empty());
    if let Some(site) = site {
        let (overall_cur, overall_prev, terms_cur, terms_prev, pages_cur, pages_prev) = tokio::join!(
            provider.fetch_gsc(site, token, &ranges.current),
            provider.fetch_gsc(site, token, &ranges.previous),
            provider.fetch_search_terms(site, token, &ranges.current),
            provider.fetch_search_terms(site, token, &ranges.previous),
            provider.fetch_gsc_pages(site, token, &ranges.current),
            provider.fetch_gsc_pages(site, token, &ranges.previous),
        );

        inputs.current_gsc = ok_or_warn(overall_cur, window, "Search Console current period");
        inputs.previous_gsc = ok_or_warn(overall_prev, window, "Search Console previous period");

        let terms_prev = ok_or_warn(terms_prev, window, "search terms previous period");
        inputs.search_terms = ok_or_warn(terms_cur, window, "search terms current period")
            .map(|cur| combine_term_reports(&cur, &terms_prev.unwrap_or_default()));

        let pages_prev = ok_or_warn(pages_prev, window, "page report previous period");
        inputs.pages = ok_or_warn(pages_cur, window, "page report current period")
            .map(|cur| combine_term_reports(&cur, &pages_prev.unwrap_or_default()));
    }

    if inputs.current_ga4.is_none() && inputs.current_gsc.is_none() {
        tracing::warn!(?window, "no data source returned data; window omitted");
        return None;
    }

    Some(analyze_period(&ranges, &inputs))
}

async fn fetch_ga4(
    provider: &dyn GoogleDataProvider,
    request: &ReportRequest,
    token: &str,
    range: &searchlens_core::report::DateRange,
    goal: &ConversionGoal,
    window: PeriodWindow,
) -> Option<Ga4Payload> {
    ok_or_warn(
        provider
            .fetch_ga4(&request.ga4_property, token, range, goal)
            .await,
        window,
        "GA4 report",
    )
}

fn ok_or_warn<T>(result: anyhow::Result<T>, window: PeriodWindow, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(?window, error = %error, "{what} fetch failed; continuing without it");
            None
        }
    }
}
