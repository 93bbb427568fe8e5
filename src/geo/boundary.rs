//! Decorative circular boundary around a community
//!
//! Not an administrative boundary: a ring of `points` vertices at a fixed
//! radius, using a flat degrees-per-kilometre approximation.

use std::f64::consts::PI;

use crate::models::Coordinates;

/// Kilometres per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.32;

pub const DEFAULT_BOUNDARY_RADIUS_KM: f64 = 2.0;
pub const DEFAULT_BOUNDARY_POINTS: usize = 64;

/// Closed ring approximating a circle around `center`.
///
/// Returns `points + 1` vertices with the first repeated last; an empty ring
/// when `points` is zero.
#[must_use]
pub fn boundary_ring(center: Coordinates, radius_km: f64, points: usize) -> Vec<Coordinates> {
    if points == 0 {
        return Vec::new();
    }

    let lat_radius = radius_km / KM_PER_DEGREE;
    let lon_radius = radius_km / (KM_PER_DEGREE * center.latitude.to_radians().cos());

    let mut ring: Vec<Coordinates> = (0..points)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (points as f64);
            Coordinates::new(
                center.latitude + lat_radius * angle.sin(),
                center.longitude + lon_radius * angle.cos(),
            )
        })
        .collect();
    ring.push(ring[0]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance_km;
    use rstest::rstest;

    #[rstest]
    #[case(Coordinates::new(-23.5505, -46.6333), 2.0, 64)]
    #[case(Coordinates::new(0.0, 0.0), 0.5, 3)]
    #[case(Coordinates::new(60.0, 179.9), 10.0, 7)]
    #[case(Coordinates::new(-89.0, -180.0), 2.0, 1)]
    fn test_ring_is_closed(#[case] center: Coordinates, #[case] radius: f64, #[case] n: usize) {
        let ring = boundary_ring(center, radius, n);
        assert_eq!(ring.len(), n + 1);
        assert_eq!(ring.first(), ring.last());
        assert!(ring.iter().all(|p| p.latitude.is_finite() && p.longitude.is_finite()));
    }

    #[test]
    fn test_ring_vertices_lie_near_radius() {
        let center = Coordinates::new(-23.5505, -46.6333);
        let ring = boundary_ring(center, DEFAULT_BOUNDARY_RADIUS_KM, DEFAULT_BOUNDARY_POINTS);
        for vertex in &ring {
            let d = distance_km(center, *vertex);
            assert!((d - 2.0).abs() < 0.05, "vertex at {d} km");
        }
    }

    #[test]
    fn test_first_vertex_is_due_east() {
        let center = Coordinates::new(10.0, 20.0);
        let ring = boundary_ring(center, 2.0, 4);
        assert_eq!(ring[0].latitude, 10.0);
        assert!(ring[0].longitude > 20.0);
        assert!(ring[1].latitude > 10.0);
    }

    #[test]
    fn test_zero_points_yields_empty_ring() {
        assert!(boundary_ring(Coordinates::new(0.0, 0.0), 2.0, 0).is_empty());
    }
}
