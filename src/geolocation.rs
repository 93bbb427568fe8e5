//! Geolocation acquisition
//!
//! Position requests are one-shot. Whatever goes wrong (permission denied,
//! no capability, timeout) the caller still gets a location: the configured
//! fallback coordinate, tagged as such.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::models::{Coordinates, UserLocation};

/// Default position used when geolocation fails: São Paulo city centre
pub const DEFAULT_FALLBACK: Coordinates = Coordinates::new(-23.5505, -46.6333);

/// Reasons a position request fails
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
    #[error("geolocation not supported")]
    Unsupported,
}

/// Source of the user's current position
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Platform without a geolocation capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Outcome reported by a remote client, e.g. a browser calling the HTTP API
#[derive(Debug, Clone, Copy)]
pub struct ReportedPosition(pub Result<Coordinates, GeolocationError>);

impl ReportedPosition {
    /// Build from optional query parameters; a missing coordinate counts as
    /// an unavailable position.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>, denied: bool) -> Self {
        if denied {
            return Self(Err(GeolocationError::PermissionDenied));
        }
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self(Ok(Coordinates::new(lat, lon))),
            _ => Self(Err(GeolocationError::PositionUnavailable)),
        }
    }
}

#[async_trait]
impl GeolocationProvider for ReportedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.0
    }
}

/// Lifecycle of a single position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationState {
    Idle,
    Requesting,
    Resolved(Coordinates),
    DeniedAndDefaulted {
        fallback: Coordinates,
        reason: GeolocationError,
    },
}

/// One-shot request tracker: `Idle -> Requesting -> Resolved | DeniedAndDefaulted`
#[derive(Debug, Clone)]
pub struct GeolocationRequest {
    state: GeolocationState,
    fallback: Coordinates,
}

impl GeolocationRequest {
    #[must_use]
    pub fn new(fallback: Coordinates) -> Self {
        Self {
            state: GeolocationState::Idle,
            fallback,
        }
    }

    #[must_use]
    pub fn state(&self) -> GeolocationState {
        self.state
    }

    /// Move to `Requesting`. Returns false if the request already started.
    pub fn start(&mut self) -> bool {
        if self.state != GeolocationState::Idle {
            return false;
        }
        self.state = GeolocationState::Requesting;
        true
    }

    /// Record the platform's answer. Ignored unless a request is in flight.
    pub fn complete(
        &mut self,
        outcome: Result<Coordinates, GeolocationError>,
    ) -> Option<UserLocation> {
        if self.state != GeolocationState::Requesting {
            return None;
        }
        let location = match outcome {
            Ok(coordinates) => {
                self.state = GeolocationState::Resolved(coordinates);
                UserLocation::device(coordinates)
            }
            Err(reason) => {
                self.state = GeolocationState::DeniedAndDefaulted {
                    fallback: self.fallback,
                    reason,
                };
                UserLocation::fallback(self.fallback)
            }
        };
        Some(location)
    }

    /// The settled location, if the request has finished
    #[must_use]
    pub fn location(&self) -> Option<UserLocation> {
        match self.state {
            GeolocationState::Resolved(coordinates) => Some(UserLocation::device(coordinates)),
            GeolocationState::DeniedAndDefaulted { fallback, .. } => {
                Some(UserLocation::fallback(fallback))
            }
            GeolocationState::Idle | GeolocationState::Requesting => None,
        }
    }
}

/// Ask `provider` once for the user's position, falling back on any failure.
///
/// With a `timeout`, a provider that does not answer in time is treated as
/// [`GeolocationError::Timeout`].
#[instrument(skip(provider))]
pub async fn acquire_user_location(
    provider: &dyn GeolocationProvider,
    fallback: Coordinates,
    timeout: Option<Duration>,
) -> UserLocation {
    let mut request = GeolocationRequest::new(fallback);
    request.start();

    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.current_position())
            .await
            .unwrap_or(Err(GeolocationError::Timeout)),
        None => provider.current_position().await,
    };

    match &outcome {
        Ok(coordinates) => info!("User located at {}", coordinates.format_coordinates()),
        Err(reason) => warn!(
            "Geolocation failed ({}), using fallback {}",
            reason,
            fallback.format_coordinates()
        ),
    }

    request
        .complete(outcome)
        .unwrap_or(UserLocation::fallback(fallback))
}
