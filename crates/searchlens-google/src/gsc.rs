//! Search Console Search Analytics client.

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use searchlens_core::gsc::SearchAnalyticsResponse;
use searchlens_core::report::DateRange;

use crate::HttpGoogleClient;

const WEBMASTERS_BASE: &str = "https://www.googleapis.com/webmasters/v3/sites";

/// Percent-encode a site identifier ("https://example.com/" or
/// "sc-domain:example.com") into one URL path segment, the way the
/// API expects it.
fn encode_site_id(site: &str) -> String {
    let mut encoded = String::with_capacity(site.len() * 3);
    for byte in site.trim().bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn search_query_url(site: &str) -> String {
    format!(
        "{WEBMASTERS_BASE}/{}/searchAnalytics/query",
        encode_site_id(site)
    )
}

impl HttpGoogleClient {
    async fn search_query(
        &self,
        site: &str,
        access_token: &str,
        body: serde_json::Value,
    ) -> Result<SearchAnalyticsResponse> {
        let url = search_query_url(site);
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .context("Search Console request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("Search Console API error: {status} - {detail}"));
        }
        response
            .json::<SearchAnalyticsResponse>()
            .await
            .context("decoding Search Console response")
    }

    /// Dimensionless query: one aggregate row for the range.
    pub(crate) async fn fetch_gsc_overall(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        self.search_query(
            site,
            access_token,
            json!({
                "startDate": range.start.to_string(),
                "endDate": range.end.to_string(),
                "dimensions": [],
            }),
        )
        .await
    }

    /// One row per `dimension` value ("query" or "page"), capped at
    /// `row_limit`.
    pub(crate) async fn fetch_gsc_dimension(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
        dimension: &str,
        row_limit: u32,
    ) -> Result<SearchAnalyticsResponse> {
        self.search_query(
            site,
            access_token,
            json!({
                "startDate": range.start.to_string(),
                "endDate": range.end.to_string(),
                "dimensions": [dimension],
                "rowLimit": row_limit,
            }),
        )
        .await
    }
}
