//! Map scene derivation
//!
//! [`build_map_view`] turns a user location and the community list into
//! everything the map renderer draws. [`LocatorState`] is the caller-owned
//! update loop: feed it inputs as they arrive and it hands back a fresh view
//! once both are known.

use serde::{Deserialize, Serialize};

use crate::geo::{CityTable, DEFAULT_BOUNDARY_POINTS, DEFAULT_BOUNDARY_RADIUS_KM, boundary_ring};
use crate::locator::{
    NearestCommunity, RankedCommunity, find_nearest, rank_by_distance, resolve_coordinates,
};
use crate::models::{Community, Coordinates, UserLocation};

/// Visual parameters for the derived scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStyle {
    pub boundary_radius_km: f64,
    pub boundary_points: usize,
    /// Zoom when centred on the nearest community
    pub nearest_zoom: u8,
    /// Zoom when there is nothing to focus on
    pub default_zoom: u8,
    pub community_color: String,
    pub nearest_color: String,
    pub user_color: String,
    pub community_marker_size: u32,
    pub nearest_marker_size: u32,
    pub user_marker_size: u32,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            boundary_radius_km: DEFAULT_BOUNDARY_RADIUS_KM,
            boundary_points: DEFAULT_BOUNDARY_POINTS,
            nearest_zoom: 13,
            default_zoom: 11,
            community_color: "#3b82f6".to_string(),
            nearest_color: "#ef4444".to_string(),
            user_color: "#10b981".to_string(),
            community_marker_size: 8,
            nearest_marker_size: 14,
            user_marker_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub coordinates: Coordinates,
    pub color: String,
    pub size: u32,
    /// `None` for the user's own marker
    pub community_id: Option<String>,
    pub label: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryOverlay {
    pub community_id: String,
    pub color: String,
    pub radius_km: f64,
    /// Closed ring, first vertex repeated last
    pub ring: Vec<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

/// Everything the renderer needs to draw the community map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub user: UserLocation,
    pub user_marker: Marker,
    pub markers: Vec<Marker>,
    pub nearest: Option<NearestCommunity>,
    pub boundary: Option<BoundaryOverlay>,
    pub viewport: Viewport,
}

impl MapView {
    /// The highlighted marker, if any community was matched
    #[must_use]
    pub fn highlighted_marker(&self) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.highlighted)
    }
}

/// Derive the map scene for `user`. Pure; call again whenever an input changes.
#[must_use]
pub fn build_map_view(
    user: UserLocation,
    communities: &[Community],
    cities: &CityTable,
    style: &MapStyle,
) -> MapView {
    let nearest = find_nearest(user.coordinates, communities, cities);
    let nearest_index = nearest.as_ref().map(|n| n.index);

    let markers = communities
        .iter()
        .enumerate()
        .filter_map(|(index, community)| {
            let (coordinates, _) = resolve_coordinates(community, cities)?;
            let highlighted = nearest_index == Some(index);
            let (color, size) = if highlighted {
                (&style.nearest_color, style.nearest_marker_size)
            } else {
                (&style.community_color, style.community_marker_size)
            };
            Some(Marker {
                coordinates,
                color: color.clone(),
                size,
                community_id: Some(community.id.clone()),
                label: community.display_name(),
                highlighted,
            })
        })
        .collect();

    let user_marker = Marker {
        coordinates: user.coordinates,
        color: style.user_color.clone(),
        size: style.user_marker_size,
        community_id: None,
        label: "You are here".to_string(),
        highlighted: false,
    };

    let boundary = nearest.as_ref().map(|n| BoundaryOverlay {
        community_id: n.community.id.clone(),
        color: style.nearest_color.clone(),
        radius_km: style.boundary_radius_km,
        ring: boundary_ring(n.coordinates, style.boundary_radius_km, style.boundary_points),
    });

    let viewport = match &nearest {
        Some(n) => Viewport {
            center: n.coordinates,
            zoom: style.nearest_zoom,
        },
        None => Viewport {
            center: user.coordinates,
            zoom: style.default_zoom,
        },
    };

    MapView {
        user,
        user_marker,
        markers,
        nearest,
        boundary,
        viewport,
    }
}

/// Inputs for the map, updated independently and in any order
#[derive(Debug, Clone)]
pub struct LocatorState {
    cities: CityTable,
    style: MapStyle,
    user: Option<UserLocation>,
    communities: Option<Vec<Community>>,
}

impl LocatorState {
    #[must_use]
    pub fn new(cities: CityTable, style: MapStyle) -> Self {
        Self {
            cities,
            style,
            user: None,
            communities: None,
        }
    }

    /// Record the user's location; returns the recomputed view when ready
    pub fn set_user_location(&mut self, user: UserLocation) -> Option<MapView> {
        self.user = Some(user);
        self.view()
    }

    /// Replace the community list; returns the recomputed view when ready
    pub fn set_communities(&mut self, communities: Vec<Community>) -> Option<MapView> {
        self.communities = Some(communities);
        self.view()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.user.is_some() && self.communities.is_some()
    }

    /// Current view, or `None` until both inputs have arrived
    #[must_use]
    pub fn view(&self) -> Option<MapView> {
        let user = self.user?;
        let communities = self.communities.as_deref()?;
        Some(build_map_view(user, communities, &self.cities, &self.style))
    }

    /// Current communities ranked by distance from the user, using the same
    /// city table as the view. Empty until both inputs have arrived.
    #[must_use]
    pub fn ranked(&self, limit: Option<usize>) -> Vec<RankedCommunity<'_>> {
        match (self.user, self.communities.as_deref()) {
            (Some(user), Some(communities)) => {
                rank_by_distance(user.coordinates, communities, &self.cities, limit)
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::DEFAULT_FALLBACK;

    fn communities() -> Vec<Community> {
        vec![
            Community::new("x", "São Paulo", "SP").with_coordinates(-23.55, -46.63),
            Community::new("y", "Rio de Janeiro", "RJ").with_coordinates(-22.9068, -43.1729),
            Community::new("cps", "Campinas", "SP"),
            Community::new("lost", "Atlantis", "XX"),
        ]
    }

    #[test]
    fn test_view_highlights_nearest() {
        let user = UserLocation::device(Coordinates::new(-23.5505, -46.6333));
        let style = MapStyle::default();
        let view = build_map_view(user, &communities(), &CityTable::brazil(), &style);

        assert_eq!(view.markers.len(), 3);
        assert_eq!(view.markers.iter().filter(|m| m.highlighted).count(), 1);

        let highlighted = view.highlighted_marker().unwrap();
        assert_eq!(highlighted.community_id.as_deref(), Some("x"));
        assert_eq!(highlighted.color, style.nearest_color);
        assert!(highlighted.size > style.community_marker_size);

        let nearest = view.nearest.as_ref().unwrap();
        assert_eq!(view.viewport.center, nearest.coordinates);
        assert_eq!(view.viewport.zoom, style.nearest_zoom);

        let boundary = view.boundary.as_ref().unwrap();
        assert_eq!(boundary.community_id, "x");
        assert_eq!(boundary.ring.len(), style.boundary_points + 1);
        assert_eq!(boundary.ring.first(), boundary.ring.last());
    }

    #[test]
    fn test_view_without_communities() {
        let user = UserLocation::fallback(DEFAULT_FALLBACK);
        let style = MapStyle::default();
        let view = build_map_view(user, &[], &CityTable::brazil(), &style);

        assert!(view.markers.is_empty());
        assert!(view.nearest.is_none());
        assert!(view.boundary.is_none());
        assert_eq!(view.viewport.center, DEFAULT_FALLBACK);
        assert_eq!(view.viewport.zoom, style.default_zoom);
        assert_eq!(view.user_marker.coordinates, DEFAULT_FALLBACK);
    }

    #[test]
    fn test_duplicate_ids_highlight_once() {
        let rows = vec![
            Community::new("dup", "Recife", "PE"),
            Community::new("dup", "Natal", "RN"),
        ];
        let user = UserLocation::device(Coordinates::new(-5.8, -35.2));
        let view = build_map_view(user, &rows, &CityTable::brazil(), &MapStyle::default());
        assert_eq!(view.markers.iter().filter(|m| m.highlighted).count(), 1);
        assert!(view.markers[1].highlighted);
    }

    #[test]
    fn test_state_waits_for_both_inputs() {
        let mut state = LocatorState::new(CityTable::brazil(), MapStyle::default());
        assert!(!state.is_ready());
        assert!(state.view().is_none());

        assert!(state.set_communities(communities()).is_none());
        let view = state
            .set_user_location(UserLocation::fallback(DEFAULT_FALLBACK))
            .unwrap();
        assert_eq!(view.nearest.unwrap().community.id, "x");
    }

    #[test]
    fn test_state_recomputes_on_change() {
        let mut state = LocatorState::new(CityTable::brazil(), MapStyle::default());
        assert!(
            state
                .set_user_location(UserLocation::device(Coordinates::new(-22.9, -43.2)))
                .is_none()
        );

        let view = state.set_communities(communities()).unwrap();
        assert_eq!(view.nearest.unwrap().community.id, "y");

        let view = state
            .set_user_location(UserLocation::device(Coordinates::new(-22.91, -47.06)))
            .unwrap();
        assert_eq!(view.nearest.unwrap().community.id, "cps");

        let view = state.set_communities(Vec::new()).unwrap();
        assert!(view.nearest.is_none());
    }

    #[test]
    fn test_state_ranks_with_its_city_table() {
        let mut state = LocatorState::new(CityTable::brazil(), MapStyle::default());
        assert!(state.ranked(None).is_empty());

        state.set_communities(communities());
        assert!(state.ranked(None).is_empty());

        let view = state
            .set_user_location(UserLocation::fallback(DEFAULT_FALLBACK))
            .unwrap();
        let ranked = state.ranked(Some(2));
        let ids: Vec<_> = ranked.iter().map(|r| r.community.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "cps"]);
        assert_eq!(ranked[0].distance_km, view.nearest.unwrap().distance_km);
        assert_eq!(state.ranked(None).len(), 3);
    }
}
