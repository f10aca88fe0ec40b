//! Bee-Density Heatmap Layer
//!
//! Converts scored observation sites into the weighted point list the map
//! client feeds straight into its heatmap overlay. Weight is the site's
//! pollination chance, so the layer doubles as a density proxy for likely
//! pollinator activity.

use serde::{Deserialize, Serialize};

use crate::feature::FeatureCollection;
use crate::scoring::pollination_chance;

/// Default half-width of the square region around the device location, in
/// degrees. Matches the map region the client animates to on a location fix.
pub const DEFAULT_REGION_DELTA: f64 = 0.5;

/// One heatmap sample, serialized exactly as the map overlay consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Pollination chance of the site, in [0, 1].
    pub weight: f64,
}

/// Square query region around a point, clamped to valid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn around(latitude: f64, longitude: f64, delta: f64) -> Self {
        let delta = delta.abs();
        GeoBounds {
            min_lat: (latitude - delta).max(-90.0),
            max_lat: (latitude + delta).min(90.0),
            min_lon: (longitude - delta).max(-180.0),
            max_lon: (longitude + delta).min(180.0),
        }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

/// Build heatmap points from a measurement search result.
///
/// Sites without usable point geometry are skipped; order is preserved.
pub fn build_bee_map(collection: &FeatureCollection) -> Vec<HeatmapPoint> {
    collection
        .features
        .iter()
        .filter_map(|feature| {
            let (latitude, longitude) = feature.coordinates()?;
            Some(HeatmapPoint {
                latitude,
                longitude,
                weight: pollination_chance(&feature.properties),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_bounds_around_point() {
        let bounds = GeoBounds::around(-3.74, -38.5, 0.5);
        assert_relative_eq!(bounds.min_lat, -4.24);
        assert_relative_eq!(bounds.max_lat, -3.24);
        assert_relative_eq!(bounds.min_lon, -39.0);
        assert_relative_eq!(bounds.max_lon, -38.0);
        assert!(bounds.contains(-3.74, -38.5));
        assert!(!bounds.contains(-3.74, -40.0));
    }

    #[test]
    fn test_bounds_clamp_at_poles_and_antimeridian() {
        let bounds = GeoBounds::around(89.8, 179.9, 0.5);
        assert_relative_eq!(bounds.max_lat, 90.0);
        assert_relative_eq!(bounds.max_lon, 180.0);

        let bounds = GeoBounds::around(-89.8, -179.9, 0.5);
        assert_relative_eq!(bounds.min_lat, -90.0);
        assert_relative_eq!(bounds.min_lon, -180.0);
    }

    #[test]
    fn test_build_bee_map_weights_and_skips() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-38.5, -3.74] },
                    "properties": {
                        "siteName": "Full canopy",
                        "landcoversNorthClassifications": "100% Trees MUC 1",
                        "landcoversSouthClassifications": "100% Trees MUC 1",
                        "landcoversEastClassifications": "100% Trees MUC 1",
                        "landcoversWestClassifications": "100% Trees MUC 1"
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "siteName": "No geometry" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-38.6, -3.80] },
                    "properties": {
                        "siteName": "Residential block",
                        "landcoversNorthClassifications": "50% Houses MUC 91"
                    }
                }
            ]
        }))
        .unwrap();

        let points = build_bee_map(&collection);
        assert_eq!(points.len(), 2);

        assert_relative_eq!(points[0].latitude, -3.74);
        assert_relative_eq!(points[0].longitude, -38.5);
        assert_relative_eq!(points[0].weight, 1.0);

        assert_relative_eq!(points[1].weight, 0.05 / 4.0);
    }

    #[test]
    fn test_heatmap_point_wire_shape() {
        let point = HeatmapPoint { latitude: -3.74, longitude: -38.5, weight: 0.25 };
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(
            value,
            json!({ "latitude": -3.74, "longitude": -38.5, "weight": 0.25 })
        );
    }
}
