use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use community_locator::api::AppState;
use community_locator::geolocation::{FixedPosition, GeolocationProvider, NoGeolocation};
use community_locator::source::{self, CommunitySource, JsonFileSource};
use community_locator::{
    CityTable, Coordinates, LocatorConfig, LocatorState, MapView, acquire_user_location, logging,
    web,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the community nearest to a position
    Locate {
        #[arg(long, value_name = "FILE")]
        communities: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Number of nearby communities to list
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Print the derived map scene as JSON
    Map {
        #[arg(long, value_name = "FILE")]
        communities: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },
    /// Serve the map API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn community_source(
    config: &LocatorConfig,
    file: Option<PathBuf>,
) -> Result<Box<dyn CommunitySource>> {
    match file {
        Some(path) => Ok(Box::new(JsonFileSource::new(path))),
        None => Ok(source::from_config(&config.source)?),
    }
}

fn position_provider(lat: Option<f64>, lon: Option<f64>) -> Box<dyn GeolocationProvider> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Box::new(FixedPosition(Coordinates::new(lat, lon))),
        _ => Box::new(NoGeolocation),
    }
}

/// Run the position request and the community fetch side by side and feed
/// both into the locator state
async fn derive_view(
    config: &LocatorConfig,
    source: &dyn CommunitySource,
    provider: &dyn GeolocationProvider,
) -> Result<(MapView, LocatorState)> {
    let mut state = LocatorState::new(CityTable::brazil(), config.map.style());

    let (user, communities) = tokio::join!(
        acquire_user_location(
            provider,
            config.geolocation.fallback(),
            config.geolocation.timeout()
        ),
        source.fetch_communities(),
    );
    let communities = communities.context("Failed to load communities")?;

    state.set_user_location(user);
    let view = state
        .set_communities(communities)
        .context("Map view not ready")?;
    Ok((view, state))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = LocatorConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose);

    match cli.command {
        Commands::Locate {
            communities,
            lat,
            lon,
            limit,
        } => {
            let source = community_source(&config, communities)?;
            let provider = position_provider(lat, lon);
            let (view, state) = derive_view(&config, source.as_ref(), provider.as_ref()).await?;

            if view.user.is_fallback() {
                println!(
                    "No position given, using default {}",
                    view.user.coordinates.format_coordinates()
                );
            }

            match &view.nearest {
                Some(nearest) => println!(
                    "Nearest community: {} ({:.2} km away, {} projects, {} beneficiaries)",
                    nearest.community.display_name(),
                    nearest.distance_km,
                    nearest.community.project_count,
                    nearest.community.beneficiaries
                ),
                None => println!("No community with known coordinates"),
            }

            for entry in state.ranked(Some(limit)) {
                println!(
                    "  - {} ({:.1} km)",
                    entry.community.display_name(),
                    entry.distance_km
                );
            }
        }
        Commands::Map {
            communities,
            lat,
            lon,
        } => {
            let source = community_source(&config, communities)?;
            let provider = position_provider(lat, lon);
            let (view, _) = derive_view(&config, source.as_ref(), provider.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Serve { port } => {
            let mut server = config.server.clone();
            if let Some(port) = port {
                server.port = port;
            }
            let state = Arc::new(AppState {
                source: source::from_config(&config.source)?,
                cities: CityTable::brazil(),
                style: config.map.style(),
                fallback: config.geolocation.fallback(),
                geolocation_timeout: config.geolocation.timeout(),
            });
            info!("Serving communities from {:?} source", config.source.kind);
            web::run(&server, state).await?;
        }
    }

    Ok(())
}
