//! Geographic primitives: distances, the city fallback table and boundary rings

pub mod boundary;
pub mod cities;
pub mod distance;

pub use boundary::{DEFAULT_BOUNDARY_POINTS, DEFAULT_BOUNDARY_RADIUS_KM, boundary_ring};
pub use cities::CityTable;
pub use distance::{EARTH_HALF_CIRCUMFERENCE_KM, EARTH_RADIUS_KM, distance_km};
