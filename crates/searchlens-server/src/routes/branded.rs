use axum::{response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use searchlens_core::branded::analyze_branded_terms;
use searchlens_core::gsc::SearchTerm;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandedTermsRequest {
    pub search_terms: Vec<SearchTerm>,
    #[serde(default)]
    pub domain: Option<String>,
}

/// `POST /api/branded-terms` - partition a term table into branded
/// and non-branded buckets with click totals and shares.
pub async fn classify_branded_terms(Json(request): Json<BrandedTermsRequest>) -> impl IntoResponse {
    let split = analyze_branded_terms(&request.search_terms, request.domain.as_deref());
    Json(json!({ "data": split }))
}
