//! HTTP implementation of [`GoogleDataProvider`] backed by the GA4
//! Data API and the Search Console Search Analytics API.

pub mod ga4;
pub mod gsc;

use anyhow::Result;

use searchlens_core::config::Config;
use searchlens_core::ga4::{ConversionGoal, Ga4Payload};
use searchlens_core::gsc::SearchAnalyticsResponse;
use searchlens_core::provider::GoogleDataProvider;
use searchlens_core::report::DateRange;

/// Shared `reqwest` client plus the row limits from configuration.
/// Cheap to clone; construct once at startup.
#[derive(Debug, Clone)]
pub struct HttpGoogleClient {
    http: reqwest::Client,
    term_row_limit: u32,
    page_row_limit: u32,
}

impl HttpGoogleClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self {
            http,
            term_row_limit: config.term_row_limit,
            page_row_limit: config.page_row_limit,
        })
    }
}

#[async_trait::async_trait]
impl GoogleDataProvider for HttpGoogleClient {
    async fn fetch_ga4(
        &self,
        property: &str,
        access_token: &str,
        range: &DateRange,
        goal: &ConversionGoal,
    ) -> Result<Ga4Payload> {
        self.fetch_ga4_window(property, access_token, range, goal)
            .await
    }

    async fn fetch_gsc(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        self.fetch_gsc_overall(site, access_token, range).await
    }

    async fn fetch_gsc_pages(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        self.fetch_gsc_dimension(site, access_token, range, "page", self.page_row_limit)
            .await
    }

    async fn fetch_search_terms(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse> {
        self.fetch_gsc_dimension(site, access_token, range, "query", self.term_row_limit)
            .await
    }
}
