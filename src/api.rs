//! HTTP API consumed by the map front end
//!
//! The browser performs the geolocation request itself and forwards the
//! outcome as query parameters; the server applies the fallback and derives
//! the scene.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, instrument};

use crate::error::LocatorError;
use crate::geo::CityTable;
use crate::geolocation::{ReportedPosition, acquire_user_location};
use crate::locator::{CoordinateOrigin, NearestCommunity, find_nearest, rank_by_distance};
use crate::map_view::{MapStyle, MapView, build_map_view};
use crate::models::{Community, Coordinates, UserLocation};
use crate::source::CommunitySource;

/// Shared state behind every handler
pub struct AppState {
    pub source: Box<dyn CommunitySource>,
    pub cities: CityTable,
    pub style: MapStyle,
    pub fallback: Coordinates,
    pub geolocation_timeout: Option<Duration>,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(LocatorError);

impl From<LocatorError> for ApiError {
    fn from(err: LocatorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        let status = if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

/// Position reported by the client
#[derive(Debug, Default, Deserialize)]
pub struct PositionQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Set when the user refused the location prompt
    #[serde(default)]
    pub denied: bool,
    /// Maximum number of nearby communities
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NearbyCommunity {
    pub community: Community,
    pub coordinates: Coordinates,
    pub origin: CoordinateOrigin,
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub user: UserLocation,
    pub nearest: Option<NearestCommunity>,
    pub communities: Vec<NearbyCommunity>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/communities", get(get_communities))
        .route("/communities/nearest", get(get_nearest))
        .route("/map", get(get_map))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_communities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Community>>, ApiError> {
    Ok(Json(state.source.fetch_communities().await?))
}

/// Fetch communities and settle the user location concurrently
async fn load_inputs(
    state: &AppState,
    query: &PositionQuery,
) -> Result<(UserLocation, Vec<Community>), ApiError> {
    let reported = ReportedPosition::from_parts(query.lat, query.lon, query.denied);
    let (user, communities) = tokio::join!(
        acquire_user_location(&reported, state.fallback, state.geolocation_timeout),
        state.source.fetch_communities(),
    );
    Ok((user, communities?))
}

#[instrument(skip(state))]
async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<MapView>, ApiError> {
    let (user, communities) = load_inputs(&state, &query).await?;
    Ok(Json(build_map_view(
        user,
        &communities,
        &state.cities,
        &state.style,
    )))
}

#[instrument(skip(state))]
async fn get_nearest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let (user, communities) = load_inputs(&state, &query).await?;

    let nearest = find_nearest(user.coordinates, &communities, &state.cities);
    let ranked = rank_by_distance(user.coordinates, &communities, &state.cities, query.limit);
    let nearby = ranked
        .into_iter()
        .map(|entry| NearbyCommunity {
            community: entry.community.clone(),
            coordinates: entry.coordinates,
            origin: entry.origin,
            distance_km: entry.distance_km,
        })
        .collect();

    Ok(Json(NearbyResponse {
        user,
        nearest,
        communities: nearby,
    }))
}
