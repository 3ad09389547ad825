use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use searchlens_core::config::Config;
use searchlens_core::ga4::{ConversionGoal, Ga4Payload};
use searchlens_core::gsc::SearchAnalyticsResponse;
use searchlens_core::provider::GoogleDataProvider;
use searchlens_core::report::DateRange;
use searchlens_server::app::build_app;
use searchlens_server::state::AppState;

struct NullProvider;

#[async_trait]
impl GoogleDataProvider for NullProvider {
    async fn fetch_ga4(
        &self,
        _property: &str,
        _access_token: &str,
        _range: &DateRange,
        _goal: &ConversionGoal,
    ) -> Result<Ga4Payload> {
        Err(anyhow!("not used in this test"))
    }

    async fn fetch_gsc(
        &self,
        _site: &str,
        _access_token: &str,
        _range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        Err(anyhow!("not used in this test"))
    }

    async fn fetch_gsc_pages(
        &self,
        _site: &str,
        _access_token: &str,
        _range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        Err(anyhow!("not used in this test"))
    }

    async fn fetch_search_terms(
        &self,
        _site: &str,
        _access_token: &str,
        _range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        Err(anyhow!("not used in this test"))
    }
}

fn app() -> axum::Router {
    let config = Config {
        port: 0,
        cors_origins: vec![],
        http_timeout_secs: 5,
        term_row_limit: 20,
        page_row_limit: 100,
    };
    build_app(Arc::new(AppState::new(Arc::new(NullProvider), config)))
}

fn term(text: &str, current: u64, previous: u64, change: &str) -> serde_json::Value {
    json!({
        "term": text,
        "current": { "clicks": current, "impressions": 900, "ctr": "6.60", "position": "3.2" },
        "previous": { "clicks": previous, "impressions": 800, "ctr": "5.00", "position": "4.0" },
        "changes": { "clicks": change, "impressions": "12.5", "ctr": "32.0", "position": "-20.0" },
    })
}

#[tokio::test]
async fn exports_terms_as_csv_attachment() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/export/search-terms")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "searchTerms": [
                            term("acme shoes", 60, 40, "50.0"),
                            term("trail running", 10, 12, "-16.7"),
                        ],
                        "filename": "weekly-terms",
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(
        headers.get("content-type").expect("content type"),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        headers.get("content-disposition").expect("disposition"),
        "attachment; filename=\"weekly-terms.csv\""
    );

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(csv.starts_with("Term,Current Clicks,Previous Clicks,Change (%)"));
    assert!(csv.contains("acme shoes,60,40,+50.0%"));
    assert!(csv.contains("trail running,10,12,-16.7%"));
}

#[tokio::test]
async fn export_with_empty_terms_still_has_header() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/export/search-terms")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "searchTerms": [] }).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(csv.starts_with("Term,Current Clicks,Previous Clicks,Change (%)"));
}
