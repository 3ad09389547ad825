//! Provider abstraction for the Google data sources.
//!
//! The trait lives here so the server can be tested against an
//! in-process stub; the HTTP implementation lives in the
//! `searchlens-google` crate.

use anyhow::Result;

use crate::ga4::{ConversionGoal, Ga4Payload};
use crate::gsc::SearchAnalyticsResponse;
use crate::report::DateRange;

#[async_trait::async_trait]
pub trait GoogleDataProvider: Send + Sync + 'static {
    /// Fetch the GA4 window bundle (session, event, and product
    /// reports) for one date range.
    async fn fetch_ga4(
        &self,
        property: &str,
        access_token: &str,
        range: &DateRange,
        goal: &ConversionGoal,
    ) -> Result<Ga4Payload>;

    /// Fetch the Search Console aggregate (no dimensions) for one
    /// date range.
    async fn fetch_gsc(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse>;

    /// Fetch the per-page Search Console report for one date range.
    async fn fetch_gsc_pages(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse>;

    /// Fetch the per-query Search Console report for one date range.
    async fn fetch_search_terms(
        &self,
        site: &str,
        access_token: &str,
        range: &DateRange,
    ) -> Result<SearchAnalyticsResponse>;
}
