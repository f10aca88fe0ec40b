//! Pollination Scorer
//!
//! Scoring core and REST backend for a map client that renders GLOBE
//! vegetation cover observations as pollination-habitat markers and a
//! bee-density heatmap.
//!
//! - `landcover`: MUC classification parsing (directional cover strings)
//! - `feature`: typed GeoJSON measurement payloads
//! - `scoring`: pollination-chance aggregation and display tiers
//! - `heatmap`: weighted points for the map overlay
//! - `globe`, `api_server` (feature `api`): upstream client and Axum service

pub mod feature;
pub mod heatmap;
pub mod landcover;
pub mod scoring;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod globe;

// Re-export commonly used types
pub use feature::{FeatureCollection, PointGeometry, SiteFeature, SiteProperties};
pub use heatmap::{build_bee_map, GeoBounds, HeatmapPoint, DEFAULT_REGION_DELTA};
pub use landcover::{parse_classifications, Direction, MucCategory, MucSegment};
pub use scoring::{pollination_chance, score_breakdown, PollinationTier, ScoreBreakdown};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
#[cfg(feature = "api")]
pub use globe::{GlobeClient, GlobeError, MeasurementWindow};
