//! GLOBE Measurement API Client
//!
//! Thin async client over the GLOBE search API
//! (<https://api.globe.gov/search/v1>) for the vegetation covers protocol.
//! Three query shapes are used:
//!   - by country code (bulk site markers)
//!   - by bounding box (bee-density heatmap around the device location)
//!   - by site id (detail view; first feature wins)
//!
//! Every request carries `geojson=TRUE` and `sample=TRUE`; both are part of
//! the upstream contract, not configuration. The protocol name keeps the
//! upstream's `vegatation_covers` spelling.

use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use thiserror::Error;

use crate::feature::{FeatureCollection, SiteFeature};
use crate::heatmap::GeoBounds;

pub const DEFAULT_BASE_URL: &str = "https://api.globe.gov/search/v1";

/// Upstream protocol identifier (sic).
pub const VEGETATION_PROTOCOL: &str = "vegatation_covers";

const COUNTRY_ENDPOINT: &str = "measurement/protocol/measureddate/country/";
const LATLON_ENDPOINT: &str = "measurement/protocol/measureddate/latlon/";
const SITEID_ENDPOINT: &str = "measurement/protocol/measureddate/siteid/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("GLOBE request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GLOBE returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("failed to decode GLOBE response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("site {0} has no vegetation cover measurements in the window")]
    SiteNotFound(String),
}

/// Measured-on date range sent with every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MeasurementWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        MeasurementWindow { start, end }
    }

    /// Two years of measurements ending today.
    pub fn last_two_years() -> Self {
        let end = Utc::now().date_naive();
        let start = end.checked_sub_days(Days::new(730)).unwrap_or(end);
        MeasurementWindow { start, end }
    }
}

impl Default for MeasurementWindow {
    fn default() -> Self {
        Self::last_two_years()
    }
}

pub struct GlobeClient {
    http: reqwest::Client,
    base_url: String,
}

impl GlobeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GlobeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(GlobeClient {
            http,
            base_url: base_url.into(),
        })
    }

    /// Bulk search: all vegetation cover sites of one country in the window.
    pub async fn country_measurements(
        &self,
        countrycode: &str,
        window: MeasurementWindow,
    ) -> Result<FeatureCollection, GlobeError> {
        let mut params = base_params(window);
        params.push(("countrycode", countrycode.to_string()));
        self.fetch(COUNTRY_ENDPOINT, &params).await
    }

    /// Spatial search: all sites inside a bounding box in the window.
    pub async fn bounds_measurements(
        &self,
        bounds: GeoBounds,
        window: MeasurementWindow,
    ) -> Result<FeatureCollection, GlobeError> {
        let mut params = base_params(window);
        params.push(("minlat", bounds.min_lat.to_string()));
        params.push(("maxlat", bounds.max_lat.to_string()));
        params.push(("minlon", bounds.min_lon.to_string()));
        params.push(("maxlon", bounds.max_lon.to_string()));
        self.fetch(LATLON_ENDPOINT, &params).await
    }

    /// Detail lookup: the site's most recent measurement in the window.
    pub async fn site_measurements(
        &self,
        site_id: &str,
        window: MeasurementWindow,
    ) -> Result<SiteFeature, GlobeError> {
        let mut params = base_params(window);
        params.push(("siteid", site_id.to_string()));
        let collection = self.fetch(SITEID_ENDPOINT, &params).await?;
        collection
            .features
            .into_iter()
            .next()
            .ok_or_else(|| GlobeError::SiteNotFound(site_id.to_string()))
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<FeatureCollection, GlobeError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        tracing::debug!("GLOBE query {} ({} params)", url, params.len());

        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GlobeError::Status { status, url });
        }

        let bytes = response.bytes().await?;
        let collection: FeatureCollection = serde_json::from_slice(&bytes)?;
        tracing::debug!("GLOBE returned {} features", collection.features.len());
        Ok(collection)
    }
}

fn base_params(window: MeasurementWindow) -> Vec<(&'static str, String)> {
    vec![
        ("protocols", VEGETATION_PROTOCOL.to_string()),
        ("startdate", window.start.to_string()),
        ("enddate", window.end.to_string()),
        ("geojson", "TRUE".to_string()),
        ("sample", "TRUE".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_dates_format_as_iso() {
        let window = MeasurementWindow::new(
            NaiveDate::from_ymd_opt(2023, 5, 5).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
        );
        let params = base_params(window);
        assert!(params.contains(&("startdate", "2023-05-05".to_string())));
        assert!(params.contains(&("enddate", "2025-05-05".to_string())));
        assert!(params.contains(&("protocols", "vegatation_covers".to_string())));
        assert!(params.contains(&("geojson", "TRUE".to_string())));
        assert!(params.contains(&("sample", "TRUE".to_string())));
    }

    #[test]
    fn test_default_window_spans_two_years() {
        let window = MeasurementWindow::default();
        assert_eq!((window.end - window.start).num_days(), 730);
    }
}
