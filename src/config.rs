//! Configuration management for the community locator
//!
//! Handles loading configuration from files and environment variables,
//! and validates every setting before it is used.

use crate::LocatorError;
use crate::geo::{DEFAULT_BOUNDARY_POINTS, DEFAULT_BOUNDARY_RADIUS_KM};
use crate::geolocation::DEFAULT_FALLBACK;
use crate::map_view::MapStyle;
use crate::models::Coordinates;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Where community rows come from
    #[serde(default)]
    pub source: SourceConfig,
    /// Map scene settings
    #[serde(default)]
    pub map: MapConfig,
    /// Geolocation fallback settings
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Rest,
}

/// Community data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// JSON file with community rows (file sources)
    #[serde(default = "default_source_path")]
    pub path: Option<PathBuf>,
    /// Hosted backend URL (rest sources)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Backend anon key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u32,
}

/// Map scene settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_boundary_radius")]
    pub boundary_radius_km: f64,
    #[serde(default = "default_boundary_points")]
    pub boundary_points: usize,
    #[serde(default = "default_nearest_zoom")]
    pub nearest_zoom: u8,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "default_community_color")]
    pub community_color: String,
    #[serde(default = "default_nearest_color")]
    pub nearest_color: String,
    #[serde(default = "default_user_color")]
    pub user_color: String,
}

/// Geolocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
    /// One-shot request timeout in seconds, 0 disables it
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

// Default value functions
fn default_source_path() -> Option<PathBuf> {
    Some(PathBuf::from("communities.json"))
}

fn default_source_timeout() -> u32 {
    15
}

fn default_boundary_radius() -> f64 {
    DEFAULT_BOUNDARY_RADIUS_KM
}

fn default_boundary_points() -> usize {
    DEFAULT_BOUNDARY_POINTS
}

fn default_nearest_zoom() -> u8 {
    13
}

fn default_zoom() -> u8 {
    11
}

fn default_community_color() -> String {
    "#3b82f6".to_string()
}

fn default_nearest_color() -> String {
    "#ef4444".to_string()
}

fn default_user_color() -> String {
    "#10b981".to_string()
}

fn default_fallback_latitude() -> f64 {
    DEFAULT_FALLBACK.latitude
}

fn default_fallback_longitude() -> f64 {
    DEFAULT_FALLBACK.longitude
}

fn default_geolocation_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u32 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::File,
            path: default_source_path(),
            base_url: None,
            api_key: None,
            timeout_seconds: default_source_timeout(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            boundary_radius_km: default_boundary_radius(),
            boundary_points: default_boundary_points(),
            nearest_zoom: default_nearest_zoom(),
            default_zoom: default_zoom(),
            community_color: default_community_color(),
            nearest_color: default_nearest_color(),
            user_color: default_user_color(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            timeout_seconds: default_geolocation_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl MapConfig {
    /// Scene style derived from these settings
    #[must_use]
    pub fn style(&self) -> MapStyle {
        MapStyle {
            boundary_radius_km: self.boundary_radius_km,
            boundary_points: self.boundary_points,
            nearest_zoom: self.nearest_zoom,
            default_zoom: self.default_zoom,
            community_color: self.community_color.clone(),
            nearest_color: self.nearest_color.clone(),
            user_color: self.user_color.clone(),
            ..MapStyle::default()
        }
    }
}

impl GeolocationConfig {
    #[must_use]
    pub fn fallback(&self) -> Coordinates {
        Coordinates::new(self.fallback_latitude, self.fallback_longitude)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds.into()))
    }
}

impl LocatorConfig {
    /// Load configuration from `config_path`, else the user config directory,
    /// else `./config.toml`, then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. COMMUNITY_LOCATOR_SOURCE__BASE_URL
        builder = builder.add_source(
            Environment::with_prefix("COMMUNITY_LOCATOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: LocatorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("community-locator").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.source.timeout_seconds == 0 {
            self.source.timeout_seconds = default_source_timeout();
        }
        if self.map.community_color.is_empty() {
            self.map.community_color = default_community_color();
        }
        if self.map.nearest_color.is_empty() {
            self.map.nearest_color = default_nearest_color();
        }
        if self.map.user_color.is_empty() {
            self.map.user_color = default_user_color();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_source()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_source(&self) -> Result<()> {
        match self.source.kind {
            SourceKind::File => {
                if self.source.path.is_none() {
                    return Err(
                        LocatorError::config("A file source needs source.path to be set").into(),
                    );
                }
            }
            SourceKind::Rest => {
                let Some(base_url) = &self.source.base_url else {
                    return Err(
                        LocatorError::config("A rest source needs source.base_url to be set")
                            .into(),
                    );
                };
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(LocatorError::config(
                        "Backend base URL must be a valid HTTP or HTTPS URL",
                    )
                    .into());
                }
                if let Some(api_key) = &self.source.api_key {
                    if api_key.is_empty() {
                        return Err(LocatorError::config(
                            "Backend API key cannot be empty if provided. Either remove it or provide a valid key.",
                        )
                        .into());
                    }
                }
            }
        }

        if self.source.timeout_seconds > 300 {
            return Err(LocatorError::config("Source timeout cannot exceed 300 seconds").into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(self.map.boundary_radius_km > 0.0 && self.map.boundary_radius_km <= 100.0) {
            return Err(
                LocatorError::config("Boundary radius must be within (0, 100] km").into(),
            );
        }

        if self.map.boundary_points < 3 {
            return Err(LocatorError::config("Boundary needs at least 3 points").into());
        }

        if self.map.boundary_points > 1024 {
            return Err(LocatorError::config("Boundary points cannot exceed 1024").into());
        }

        if self.map.nearest_zoom > 22 || self.map.default_zoom > 22 {
            return Err(LocatorError::config("Zoom levels cannot exceed 22").into());
        }

        if !self.geolocation.fallback().is_in_range() {
            return Err(LocatorError::config(
                "Fallback coordinates must be within latitude [-90, 90] and longitude [-180, 180]",
            )
            .into());
        }

        if self.geolocation.timeout_seconds > 120 {
            return Err(
                LocatorError::config("Geolocation timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.server.request_timeout_seconds == 0 || self.server.request_timeout_seconds > 300 {
            return Err(LocatorError::config(
                "Request timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(LocatorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(LocatorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for color in [
            &self.map.community_color,
            &self.map.nearest_color,
            &self.map.user_color,
        ] {
            if !is_hex_color(color) {
                return Err(
                    LocatorError::config(format!("Invalid marker color '{color}'")).into(),
                );
            }
        }

        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
