//! Community locator
//!
//! Matches a user's position to the nearest registered community and derives
//! the map scene (markers, highlighted nearest community, decorative
//! boundary, initial viewport) for the NGO management console.

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod geolocation;
pub mod locator;
pub mod logging;
pub mod map_view;
pub mod models;
pub mod source;
pub mod web;

// Re-export core types for public API
pub use config::LocatorConfig;
pub use error::LocatorError;
pub use geo::{CityTable, boundary_ring, distance_km};
pub use geolocation::{
    DEFAULT_FALLBACK, GeolocationError, GeolocationProvider, GeolocationRequest, GeolocationState,
    acquire_user_location,
};
pub use locator::{NearestCommunity, RankedCommunity, find_nearest, rank_by_distance};
pub use map_view::{LocatorState, MapStyle, MapView, build_map_view};
pub use models::{Community, Coordinates, LocationSource, UserLocation};
pub use source::CommunitySource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, LocatorError>;
