//! Great-circle distance between coordinates

use haversine::{Location as HaversineLocation, Units, distance};

use crate::models::Coordinates;

/// Mean Earth radius used by the Haversine formula, in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Upper bound for any great-circle distance (half the circumference)
pub const EARTH_HALF_CIRCUMFERENCE_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;

impl From<Coordinates> for HaversineLocation {
    fn from(coordinates: Coordinates) -> Self {
        HaversineLocation {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }
}

/// Haversine distance in kilometres.
///
/// Coordinates are not validated; out-of-range input yields a defined but
/// meaningless value. Near-antipodal pairs are kept within
/// `[0, EARTH_HALF_CIRCUMFERENCE_KM]`.
#[must_use]
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let km = distance(from.into(), to.into(), Units::Kilometers);
    if km.is_finite() {
        km
    } else {
        clamped_haversine(from, to)
    }
}

/// Haversine with the half-chord term clamped to `[0, 1]`. Rounding can push
/// it past 1 for antipodal points, which makes `sqrt(1 - a)` NaN.
fn clamped_haversine(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;

    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
