//! Community data sources
//!
//! The map only reads communities. Rows come from a JSON export on disk or
//! straight from the hosted backend's REST interface.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::config::{SourceConfig, SourceKind};
use crate::error::LocatorError;
use crate::models::Community;

/// Anything that can produce the current community list
#[async_trait]
pub trait CommunitySource: Send + Sync {
    async fn fetch_communities(&self) -> Result<Vec<Community>>;
}

/// Build the configured source
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn CommunitySource>> {
    match config.kind {
        SourceKind::File => {
            let path = config
                .path
                .clone()
                .ok_or_else(|| LocatorError::config("source.path is required for file sources"))?;
            Ok(Box::new(JsonFileSource::new(path)))
        }
        SourceKind::Rest => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                LocatorError::config("source.base_url is required for rest sources")
            })?;
            Ok(Box::new(RestCommunitySource::new(
                base_url,
                config.api_key.clone(),
                Duration::from_secs(config.timeout_seconds.into()),
            )?))
        }
    }
}

/// In-memory rows
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    communities: Vec<Community>,
}

impl StaticSource {
    #[must_use]
    pub fn new(communities: Vec<Community>) -> Self {
        Self { communities }
    }
}

#[async_trait]
impl CommunitySource for StaticSource {
    async fn fetch_communities(&self) -> Result<Vec<Community>> {
        Ok(self.communities.clone())
    }
}

/// A JSON array of community rows on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CommunitySource for JsonFileSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_communities(&self) -> Result<Vec<Community>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let communities: Vec<Community> = serde_json::from_str(&content).map_err(|e| {
            LocatorError::parse(format!(
                "Failed to parse communities from {}: {}",
                self.path.display(),
                e
            ))
        })?;
        info!("Loaded {} communities from file", communities.len());
        Ok(communities)
    }
}

/// Embedded aggregate returned for `projects(count)`
#[derive(Debug, Deserialize)]
struct ProjectCount {
    count: u32,
}

/// Row shape of the hosted `communities` table
#[derive(Debug, Deserialize)]
struct CommunityRow {
    #[serde(flatten)]
    community: Community,
    #[serde(default)]
    projects: Vec<ProjectCount>,
}

impl From<CommunityRow> for Community {
    fn from(row: CommunityRow) -> Self {
        let mut community = row.community;
        if let Some(projects) = row.projects.first() {
            community.project_count = projects.count;
        }
        community
    }
}

const COMMUNITY_COLUMNS: &str =
    "id,city,state,neighborhood,idh,beneficiaries_count,latitude,longitude,projects(count)";

/// The hosted backend's REST endpoint for the `communities` table
pub struct RestCommunitySource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestCommunitySource {
    /// Create a new client
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("community-locator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LocatorError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn communities_url(&self) -> String {
        format!("{}/rest/v1/communities", self.base_url)
    }
}

#[async_trait]
impl CommunitySource for RestCommunitySource {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_communities(&self) -> Result<Vec<Community>> {
        let url = self.communities_url();
        debug!("Fetching communities from {}", url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("select", COMMUNITY_COLUMNS), ("order", "city.asc")]);

        if let Some(api_key) = &self.api_key {
            request = request
                .header("apikey", api_key)
                .header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| LocatorError::api(format!("Community request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LocatorError::api(format!(
                    "Backend rejected credentials ({status}): {error_text}"
                )),
                _ => LocatorError::api(format!("Backend error {status}: {error_text}")),
            });
        }

        let rows: Vec<CommunityRow> = response
            .json()
            .await
            .map_err(|e| LocatorError::parse(format!("Failed to parse community rows: {e}")))?;

        let communities: Vec<Community> = rows.into_iter().map(Community::from).collect();
        info!("Fetched {} communities from backend", communities.len());
        Ok(communities)
    }
}
