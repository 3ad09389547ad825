//! GA4 Data API (`runReport`) client.

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use searchlens_core::ga4::{ConversionGoal, Ga4Payload, RunReportResponse};
use searchlens_core::report::DateRange;

use crate::HttpGoogleClient;

const DATA_API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";

/// Property selectors arrive as either `properties/123` or a bare
/// numeric id; the endpoint path wants the bare id.
fn clean_property_id(property: &str) -> &str {
    let trimmed = property.trim().trim_end_matches('/');
    trimmed.strip_prefix("properties/").unwrap_or(trimmed)
}

fn date_ranges(range: &DateRange) -> serde_json::Value {
    json!([{
        "startDate": range.start.to_string(),
        "endDate": range.end.to_string(),
    }])
}

impl HttpGoogleClient {
    async fn run_report(
        &self,
        property: &str,
        access_token: &str,
        body: serde_json::Value,
    ) -> Result<RunReportResponse> {
        let url = format!(
            "{DATA_API_BASE}/properties/{}:runReport",
            clean_property_id(property)
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .context("GA4 runReport request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("GA4 API error: {status} - {detail}"));
        }
        response
            .json::<RunReportResponse>()
            .await
            .context("decoding GA4 runReport response")
    }

    /// Fetch the full GA4 bundle for one window: sessions by channel
    /// grouping, the event report, and the product report. The
    /// product report is optional on the GA4 side (no e-commerce
    /// tracking) and degrades to empty rather than failing the
    /// window.
    pub(crate) async fn fetch_ga4_window(
        &self,
        property: &str,
        access_token: &str,
        range: &DateRange,
        goal: &ConversionGoal,
    ) -> Result<Ga4Payload> {
        let session_data = self
            .run_report(
                property,
                access_token,
                json!({
                    "dateRanges": date_ranges(range),
                    "dimensions": [{"name": "sessionDefaultChannelGrouping"}],
                    "metrics": [{"name": "sessions"}],
                }),
            )
            .await?;

        let events = self
            .run_report(
                property,
                access_token,
                json!({
                    "dateRanges": date_ranges(range),
                    "dimensions": [
                        {"name": "sessionDefaultChannelGrouping"},
                        {"name": "eventName"},
                        {"name": "pagePath"},
                    ],
                    "metrics": [
                        {"name": "eventCount"},
                        {"name": "totalRevenue"},
                        {"name": "conversions"},
                    ],
                }),
            )
            .await?;

        let product_data = match self
            .run_report(
                property,
                access_token,
                json!({
                    "dateRanges": date_ranges(range),
                    "dimensions": [
                        {"name": "sessionDefaultChannelGrouping"},
                        {"name": "itemName"},
                        {"name": "itemId"},
                    ],
                    "metrics": [
                        {"name": "itemsViewed"},
                        {"name": "itemsPurchased"},
                        {"name": "itemRevenue"},
                    ],
                    "orderBys": [
                        {"metric": {"metricName": "itemRevenue"}, "desc": true}
                    ],
                    "limit": 20,
                }),
            )
            .await
        {
            Ok(response) => response.rows,
            Err(error) => {
                tracing::warn!(%property, error = %error, "GA4 product report unavailable");
                Vec::new()
            }
        };

        Ok(Ga4Payload {
            session_data,
            rows: events.rows,
            product_data,
            conversion_goal: goal.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_id_is_cleaned() {
        assert_eq!(clean_property_id("properties/12345"), "12345");
        assert_eq!(clean_property_id("properties/12345/"), "12345");
        assert_eq!(clean_property_id("12345"), "12345");
    }
}
