// Axum API Server Module
//
// Purpose: REST backend for the map client: scored site markers, site
// detail with score breakdown, and the bee-density heatmap layer.
// Upstream data comes from the GLOBE measurement API; scoring is local.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use moka::future::Cache;

use std::sync::Arc;
use std::time::Duration;

use crate::feature::SiteFeature;
use crate::globe::{GlobeClient, GlobeError, MeasurementWindow};
use crate::heatmap::{build_bee_map, GeoBounds};
use crate::scoring::{pollination_chance, score_breakdown, PollinationTier};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub globe: Arc<GlobeClient>,
    pub cache: Cache<String, serde_json::Value>,
    pub window: MeasurementWindow,
    pub country_code: String,
    pub region_delta: f64,
}

impl AppState {
    pub fn new(
        globe: GlobeClient,
        country_code: impl Into<String>,
        window: MeasurementWindow,
        region_delta: f64,
    ) -> Self {
        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(10_000) // 10K entries
            .time_to_live(Duration::from_secs(300)) // 5 min TTL
            .build();

        Self {
            globe: Arc::new(globe),
            cache,
            window,
            country_code: country_code.into(),
            region_delta,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Heatmap layer around the device location
        .route("/api/bee-map", get(bee_map))

        // Scored site markers + detail drill-down
        .route("/api/sites/search", get(search_sites))
        .route("/api/sites/:id", get(get_site))

        // Offline scoring of a single feature payload
        .route("/api/score", post(score_feature))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(CorsLayer::permissive()) // Allow all origins (adjust for production)
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Query params for the bee-density heatmap.
#[derive(Debug, serde::Deserialize)]
struct BeeMapQuery {
    lat: f64,
    lon: f64,
    /// Half-width of the query region in degrees; server default when absent.
    delta: Option<f64>,
}

async fn bee_map(
    State(state): State<AppState>,
    Query(query): Query<BeeMapQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !query.lat.is_finite() || !(-90.0..=90.0).contains(&query.lat) {
        return Err(AppError::InvalidInput(format!("latitude {} out of range", query.lat)));
    }
    if !query.lon.is_finite() || !(-180.0..=180.0).contains(&query.lon) {
        return Err(AppError::InvalidInput(format!("longitude {} out of range", query.lon)));
    }
    let delta = query.delta.unwrap_or(state.region_delta);
    if !delta.is_finite() || delta <= 0.0 {
        return Err(AppError::InvalidInput(format!("delta {} out of range", delta)));
    }

    let cache_key = format!("bee-map:{:.4}:{:.4}:{:.4}", query.lat, query.lon, delta);
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for bee map");
        return Ok(Json(cached));
    }

    let bounds = GeoBounds::around(query.lat, query.lon, delta);
    let collection = state.globe.bounds_measurements(bounds, state.window).await?;
    let points = build_bee_map(&collection);
    tracing::debug!(
        "Bee map: {} points from {} features",
        points.len(),
        collection.features.len()
    );

    // The map client consumes the bare point array
    let result = serde_json::to_value(points).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.insert(cache_key, result.clone()).await;

    Ok(Json(result))
}

/// Query params for the site marker search.
#[derive(Debug, serde::Deserialize)]
struct SiteSearchQuery {
    countrycode: Option<String>,
    startdate: Option<chrono::NaiveDate>,
    enddate: Option<chrono::NaiveDate>,
    limit: Option<usize>,
}

async fn search_sites(
    State(state): State<AppState>,
    Query(query): Query<SiteSearchQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let countrycode = query.countrycode.unwrap_or_else(|| state.country_code.clone());
    let mut window = state.window;
    if let Some(start) = query.startdate {
        window.start = start;
    }
    if let Some(end) = query.enddate {
        window.end = end;
    }
    let limit = query.limit.unwrap_or(500).min(2000);

    let cache_key = format!("sites:{}:{}:{}:{}", countrycode, window.start, window.end, limit);
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for site search");
        return Ok(Json(cached));
    }

    let collection = state.globe.country_measurements(&countrycode, window).await?;

    let data: Vec<serde_json::Value> = collection
        .features
        .iter()
        .filter_map(|feature| {
            let (latitude, longitude) = feature.coordinates()?;
            let chance = pollination_chance(&feature.properties);
            let tier = PollinationTier::from_chance(chance);
            Some(serde_json::json!({
                "latitude": latitude,
                "longitude": longitude,
                "siteId": feature.properties.site_id,
                "siteName": &feature.properties.site_name,
                "elevation": feature.properties.elevation,
                "chance": chance,
                "tier": tier,
                "markerColor": tier.marker_color(),
            }))
        })
        .take(limit)
        .collect();

    let result = serde_json::json!({
        "rows": data.len(),
        "data": data,
    });
    state.cache.insert(cache_key, result.clone()).await;

    Ok(Json(result))
}

async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cache_key = format!("site:{}", id);
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for site {}", id);
        return Ok(Json(cached));
    }

    let feature = state.globe.site_measurements(&id, state.window).await?;
    let result = site_payload(&feature);
    state.cache.insert(cache_key, result.clone()).await;

    Ok(Json(result))
}

/// Score a single feature payload without touching the upstream API.
async fn score_feature(
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let feature: SiteFeature = serde_json::from_value(body)
        .map_err(|e| AppError::InvalidInput(format!("not a vegetation cover feature: {}", e)))?;

    Ok(Json(site_payload(&feature)))
}

fn site_payload(feature: &SiteFeature) -> serde_json::Value {
    let breakdown = score_breakdown(&feature.properties);
    let coordinates = feature.coordinates();

    serde_json::json!({
        "site": &feature.properties,
        "latitude": coordinates.map(|(lat, _)| lat),
        "longitude": coordinates.map(|(_, lon)| lon),
        "chance": breakdown.chance,
        "tier": breakdown.tier,
        "markerColor": breakdown.tier.marker_color(),
        "breakdown": breakdown,
    })
}

// ============================================================================
// Error Handling
// ============================================================================

pub enum AppError {
    Upstream(String),
    Decode(String),
    InvalidInput(String),
    NotFound(String),
    Internal(String),
}

impl From<GlobeError> for AppError {
    fn from(err: GlobeError) -> Self {
        match err {
            GlobeError::SiteNotFound(_) => AppError::NotFound(err.to_string()),
            GlobeError::Decode(_) => AppError::Decode(err.to_string()),
            GlobeError::Http(_) | GlobeError::Status { .. } => AppError::Upstream(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Decode(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
