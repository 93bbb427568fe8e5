//! Community records as loaded from the data backend

use serde::{Deserialize, Deserializer, Serialize};

use super::Coordinates;

/// A community registered by an NGO
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Community {
    pub id: String,
    pub city: String,
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub neighborhood: String,
    /// Human development index, `0.0` when not calculated yet
    #[serde(default, deserialize_with = "null_as_default")]
    pub idh: f64,
    #[serde(
        default,
        alias = "beneficiaries_count",
        alias = "beneficiary_count",
        deserialize_with = "null_as_default"
    )]
    pub beneficiaries: u32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Number of linked projects
    #[serde(default, alias = "projectCount", deserialize_with = "null_as_default")]
    pub project_count: u32,
    /// Kilometres from the user; only set on the nearest match
    #[serde(
        default,
        alias = "distanceFromUser",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance_from_user: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Community {
    /// Create a community without coordinates
    #[must_use]
    pub fn new(id: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            city: city.into(),
            state: state.into(),
            neighborhood: String::new(),
            idh: 0.0,
            beneficiaries: 0,
            latitude: None,
            longitude: None,
            project_count: 0,
            distance_from_user: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = neighborhood.into();
        self
    }

    /// Precise coordinates, present only when both components are stored
    #[must_use]
    pub fn precise_coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Whether the IDH has been calculated
    #[must_use]
    pub fn has_idh(&self) -> bool {
        self.idh > 0.0
    }

    /// Human readable label, e.g. "Centro, São Paulo - SP"
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.neighborhood.is_empty() {
            format!("{} - {}", self.city, self.state)
        } else {
            format!("{}, {} - {}", self.neighborhood, self.city, self.state)
        }
    }
}
