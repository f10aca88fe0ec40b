//! GLOBE Measurement Payloads
//!
//! Typed model of the GeoJSON returned by the GLOBE measurement search API
//! (`protocols=vegatation_covers`, the upstream spelling). Only the fields
//! scoring and the detail view touch are typed; everything else the API
//! sends is retained verbatim in a flattened map so responses can pass it
//! through untouched.
//!
//! Deserialization is the validation boundary: a classification field that
//! is not a string (or absent) is a type error here, never a silently
//! coerced score.

use serde::{Deserialize, Serialize};

use crate::landcover::Direction;

/// Top-level search response: `{"type": "FeatureCollection", "features": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<SiteFeature>,

    /// `type`, result counts, and any other envelope fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One observation site measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PointGeometry>,

    pub properties: SiteProperties,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SiteFeature {
    /// `(latitude, longitude)` of the site. GeoJSON stores `[lon, lat]`;
    /// non-point or malformed geometry yields `None`.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let geometry = self.geometry.as_ref()?;
        if geometry.kind != "Point" || geometry.coordinates.len() < 2 {
            return None;
        }
        Some((geometry.coordinates[1], geometry.coordinates[0]))
    }
}

/// GeoJSON point geometry. Coordinates are `[longitude, latitude]`, with an
/// optional trailing elevation the API sometimes appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Site properties of a vegetation cover measurement.
///
/// Field names follow the upstream payload exactly, including the
/// `vegatationcovers` spelling the protocol uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,

    /// Meters above sea level; absent for some sites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegatationcovers_measured_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegatationcovers_globe_teams: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landcovers_north_classifications: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landcovers_south_classifications: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landcovers_east_classifications: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landcovers_west_classifications: Option<String>,

    /// All remaining descriptive fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SiteProperties {
    /// Classification string for one direction. Explicit per-variant lookup;
    /// the mapping to upstream keys lives in [`Direction::field_name`].
    pub fn classification(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::North => self.landcovers_north_classifications.as_deref(),
            Direction::South => self.landcovers_south_classifications.as_deref(),
            Direction::East => self.landcovers_east_classifications.as_deref(),
            Direction::West => self.landcovers_west_classifications.as_deref(),
        }
    }
}
