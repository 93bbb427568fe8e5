//! Nearest-community selection
//!
//! Matches a user position against the registered communities. A community
//! is placed at its precise coordinates when both are stored, otherwise at its
//! city's approximate centre; communities with neither are left out of the
//! ranking without comment.

use serde::Serialize;
use tracing::debug;

use crate::geo::{CityTable, distance_km};
use crate::models::{Community, Coordinates};

/// How a community's position was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrigin {
    Precise,
    City,
}

/// The community closest to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestCommunity {
    /// The community with `distance_from_user` filled in
    pub community: Community,
    /// Position in the input list
    pub index: usize,
    pub coordinates: Coordinates,
    pub origin: CoordinateOrigin,
    pub distance_km: f64,
}

/// A community together with its distance from the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCommunity<'a> {
    pub community: &'a Community,
    pub index: usize,
    pub coordinates: Coordinates,
    pub origin: CoordinateOrigin,
    pub distance_km: f64,
}

/// Resolve where a community sits: precise coordinates, then the city table
#[must_use]
pub fn resolve_coordinates(
    community: &Community,
    cities: &CityTable,
) -> Option<(Coordinates, CoordinateOrigin)> {
    if let Some(coordinates) = community.precise_coordinates() {
        return Some((coordinates, CoordinateOrigin::Precise));
    }
    cities
        .lookup(&community.city)
        .map(|coordinates| (coordinates, CoordinateOrigin::City))
}

/// Every resolvable community with its distance, in input order
fn located<'a>(
    user: Coordinates,
    communities: &'a [Community],
    cities: &'a CityTable,
) -> impl Iterator<Item = RankedCommunity<'a>> + 'a {
    communities.iter().enumerate().filter_map(move |(index, community)| {
        let Some((coordinates, origin)) = resolve_coordinates(community, cities) else {
            debug!("Skipping community {} without coordinates", community.id);
            return None;
        };
        let distance_km = distance_km(user, coordinates);
        if !distance_km.is_finite() {
            debug!("Skipping community {} with undefined distance", community.id);
            return None;
        }
        Some(RankedCommunity {
            community,
            index,
            coordinates,
            origin,
            distance_km,
        })
    })
}

/// Find the community nearest to `user`.
///
/// Returns `None` when the list is empty or nothing resolves. On exact ties
/// the first community in input order wins.
#[must_use]
pub fn find_nearest(
    user: Coordinates,
    communities: &[Community],
    cities: &CityTable,
) -> Option<NearestCommunity> {
    let mut best: Option<RankedCommunity<'_>> = None;
    for candidate in located(user, communities, cities) {
        let closer = best
            .as_ref()
            .is_none_or(|current| candidate.distance_km < current.distance_km);
        if closer {
            best = Some(candidate);
        }
    }

    best.map(|ranked| {
        let mut community = ranked.community.clone();
        community.distance_from_user = Some(ranked.distance_km);
        debug!(
            "Nearest community {} at {:.2} km",
            community.id, ranked.distance_km
        );
        NearestCommunity {
            community,
            index: ranked.index,
            coordinates: ranked.coordinates,
            origin: ranked.origin,
            distance_km: ranked.distance_km,
        }
    })
}

/// Resolvable communities sorted by distance, closest first.
///
/// The sort is stable, so equidistant communities keep their input order.
#[must_use]
pub fn rank_by_distance<'a>(
    user: Coordinates,
    communities: &'a [Community],
    cities: &'a CityTable,
    limit: Option<usize>,
) -> Vec<RankedCommunity<'a>> {
    let mut ranked: Vec<_> = located(user, communities, cities).collect();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAO_PAULO: Coordinates = Coordinates::new(-23.5505, -46.6333);

    fn community_x() -> Community {
        Community::new("x", "São Paulo", "SP").with_coordinates(-23.55, -46.63)
    }

    fn community_y() -> Community {
        Community::new("y", "Rio de Janeiro", "RJ").with_coordinates(-22.9068, -43.1729)
    }

    #[test]
    fn test_nearest_of_two() {
        let communities = vec![community_y(), community_x()];
        let nearest = find_nearest(SAO_PAULO, &communities, &CityTable::brazil()).unwrap();

        assert_eq!(nearest.community.id, "x");
        assert_eq!(nearest.origin, CoordinateOrigin::Precise);
        // Exact Haversine value is ~0.341 km
        assert!(nearest.distance_km > 0.1 && nearest.distance_km < 0.5);
        assert_eq!(nearest.community.distance_from_user, Some(nearest.distance_km));
    }

    #[test]
    fn test_single_community_distance_matches() {
        let communities = vec![community_y()];
        let nearest = find_nearest(SAO_PAULO, &communities, &CityTable::empty()).unwrap();
        let expected = distance_km(SAO_PAULO, Coordinates::new(-22.9068, -43.1729));
        assert_eq!(nearest.distance_km, expected);
        assert_eq!(nearest.community.distance_from_user, Some(expected));
    }

    #[test]
    fn test_empty_list() {
        assert!(find_nearest(SAO_PAULO, &[], &CityTable::brazil()).is_none());
    }

    #[test]
    fn test_unresolvable_community_is_excluded() {
        let lost = Community::new("lost", "Atlantis", "XX");
        assert!(find_nearest(SAO_PAULO, &[lost.clone()], &CityTable::brazil()).is_none());

        let communities = vec![lost, community_y()];
        let nearest = find_nearest(SAO_PAULO, &communities, &CityTable::brazil()).unwrap();
        assert_eq!(nearest.community.id, "y");
    }

    #[test]
    fn test_city_fallback() {
        let communities = vec![Community::new("bh", "Belo Horizonte", "MG"), community_y()];
        let user = Coordinates::new(-19.92, -43.94);
        let nearest = find_nearest(user, &communities, &CityTable::brazil()).unwrap();
        assert_eq!(nearest.community.id, "bh");
        assert_eq!(nearest.origin, CoordinateOrigin::City);
        assert_eq!(nearest.coordinates, Coordinates::new(-19.9167, -43.9345));
    }

    #[test]
    fn test_precise_coordinates_win_over_city() {
        // Registered in Rio but stored with São Paulo coordinates
        let community =
            Community::new("moved", "Rio de Janeiro", "RJ").with_coordinates(-23.55, -46.63);
        let (coords, origin) = resolve_coordinates(&community, &CityTable::brazil()).unwrap();
        assert_eq!(origin, CoordinateOrigin::Precise);
        assert_eq!(coords, Coordinates::new(-23.55, -46.63));
    }

    #[test]
    fn test_tie_goes_to_first() {
        let a = Community::new("a", "Recife", "PE");
        let b = Community::new("b", "Recife", "PE");
        let communities = vec![a, b];
        let nearest = find_nearest(SAO_PAULO, &communities, &CityTable::brazil()).unwrap();
        assert_eq!(nearest.community.id, "a");
        assert_eq!(nearest.index, 0);
    }

    #[test]
    fn test_only_nearest_is_annotated() {
        let communities = vec![community_x(), community_y()];
        let _ = find_nearest(SAO_PAULO, &communities, &CityTable::brazil());
        assert!(communities.iter().all(|c| c.distance_from_user.is_none()));
    }

    #[test]
    fn test_antipodal_community_does_not_shadow_nearest() {
        let communities = vec![
            Community::new("far", "Longyearbyen", "SV").with_coordinates(87.5, 180.0),
            Community::new("near", "Base", "AQ").with_coordinates(-87.49, 0.0),
        ];
        let user = Coordinates::new(-87.5, 0.0);
        let cities = CityTable::empty();

        let nearest = find_nearest(user, &communities, &cities).unwrap();
        assert_eq!(nearest.community.id, "near");
        assert!((nearest.distance_km - 1.11).abs() < 0.01, "got {}", nearest.distance_km);

        let ranked = rank_by_distance(user, &communities, &cities, None);
        let ids: Vec<_> = ranked.iter().map(|r| r.community.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_finite()));
    }

    #[test]
    fn test_non_finite_position_is_skipped() {
        let communities = vec![
            Community::new("broken", "Recife", "PE").with_coordinates(f64::NAN, 0.0),
            community_y(),
        ];
        let nearest = find_nearest(SAO_PAULO, &communities, &CityTable::brazil()).unwrap();
        assert_eq!(nearest.community.id, "y");
        assert_eq!(rank_by_distance(SAO_PAULO, &communities, &CityTable::brazil(), None).len(), 1);
    }

    #[test]
    fn test_rank_by_distance() {
        let communities = vec![
            community_y(),
            Community::new("lost", "Atlantis", "XX"),
            Community::new("cps", "Campinas", "SP"),
            community_x(),
        ];
        let cities = CityTable::brazil();
        let ranked = rank_by_distance(SAO_PAULO, &communities, &cities, None);
        let ids: Vec<_> = ranked.iter().map(|r| r.community.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "cps", "y"]);
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

        let top = rank_by_distance(SAO_PAULO, &communities, &cities, Some(1));
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].community.id, "x");
    }
}
