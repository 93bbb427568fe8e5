//! Coordinate and user location models

use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Whether both components lie within the usual latitude/longitude ranges
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Where a user location came from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Reported by the device geolocation capability
    Device,
    /// Substituted default after the capability failed or was missing
    Fallback,
}

/// The position the map is computed for
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct UserLocation {
    pub coordinates: Coordinates,
    pub source: LocationSource,
}

impl UserLocation {
    #[must_use]
    pub const fn device(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            source: LocationSource::Device,
        }
    }

    #[must_use]
    pub const fn fallback(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            source: LocationSource::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == LocationSource::Fallback
    }
}
