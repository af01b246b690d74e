use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use state_map_rs::config::{CountryConfig, CountryPreset};
use state_map_rs::regions::{self, RegionId, RegionSet};
use state_map_rs::render::TerminalMap;
use state_map_rs::selection::{GestureId, InputEvent, InputKind, SelectionSettings, SelectionState};
use state_map_rs::server::{self, AppState};
use state_map_rs::setup;

#[derive(Parser)]
#[command(
    name = "state-map-rs",
    version,
    about = "Serve an interactive state-level map of a country"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CountryArgs {
    /// Country preset to serve
    #[arg(
        short,
        long,
        value_enum,
        env = "STATE_MAP_COUNTRY",
        default_value_t = CountryPreset::Brazil
    )]
    country: CountryPreset,

    /// Region GeoJSON path or URL (overrides the preset's dataset)
    #[arg(short, long, env = "STATE_MAP_DATA")]
    data: Option<String>,
}

impl CountryArgs {
    fn config(&self) -> CountryConfig {
        let mut config = self.country.config();
        if let Some(data) = &self.data {
            config.dataset = data.clone();
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Serve the map page over HTTP
    Serve {
        #[command(flatten)]
        country: CountryArgs,

        /// Address to bind
        #[arg(long, env = "STATE_MAP_HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to bind (defaults to the preset's port)
        #[arg(short, long, env = "STATE_MAP_PORT")]
        port: Option<u16>,
    },

    /// Render the map as ASCII, applying region activations in order
    Preview {
        #[command(flatten)]
        country: CountryArgs,

        /// Map width in characters
        #[arg(short = 'W', long, default_value_t = 100)]
        width: usize,

        /// Map height in characters
        #[arg(short = 'H', long, default_value_t = 32)]
        height: usize,

        /// Activate a region by name (repeatable; repeating a name toggles it off)
        #[arg(short, long)]
        select: Vec<String>,

        /// Latitude (requires --lon too); activates the region at that point
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude (requires --lat too)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Serve {
            country,
            host,
            port,
        } => {
            let config = country.config();
            let regions = regions::load(&config.dataset)
                .await
                .with_context(|| format!("cannot start {} map", config.key))?;
            let addr = SocketAddr::new(host, port.unwrap_or(config.port));
            let state = AppState {
                config,
                regions,
                selection: SelectionSettings::default(),
            };
            server::serve(state, addr).await
        }
        Command::Preview {
            country,
            width,
            height,
            select,
            lat,
            lon,
        } => {
            let config = country.config();
            let regions = regions::load(&config.dataset)
                .await
                .with_context(|| format!("cannot load {} regions", config.key))?;

            let mut targets = select
                .iter()
                .map(|name| match regions.find_by_name(name) {
                    Some(r) => Ok(r.id),
                    None => bail!("unknown region: {name}"),
                })
                .collect::<anyhow::Result<Vec<RegionId>>>()?;
            if let (Some(lat), Some(lon)) = (lat, lon) {
                match regions.find_at(lon, lat) {
                    Some(r) => targets.push(r.id),
                    None => bail!("no region found at {lat}, {lon}"),
                }
            }

            preview(&config, &regions, width, height, &targets).await
        }
    }
}

async fn preview(
    config: &CountryConfig,
    regions: &RegionSet,
    width: usize,
    height: usize,
    targets: &[RegionId],
) -> anyhow::Result<()> {
    let mut surface = Some(TerminalMap::new(
        regions,
        config.center,
        config.initial_zoom,
        config.min_zoom,
        width,
        height,
    ));
    let mut controller = setup::wait_for_surface(SelectionSettings::default(), || surface.take())
        .await
        .context("selection controller setup failed")?;

    for (gesture, &region) in targets.iter().enumerate() {
        controller.handle(InputEvent {
            region,
            kind: InputKind::Click,
            gesture: GestureId(gesture as u64),
        });
        controller.on_viewport_change();
    }

    let map = controller.surface();
    println!("{}", map.render());
    println!();
    match controller.state() {
        SelectionState::Idle => println!("No region selected"),
        SelectionState::Selected(id) => {
            let name = regions.get(id).map_or("?", |r| r.name.as_str());
            println!("Selected: {name}");
        }
    }
    let camera = map.camera();
    println!(
        "View: {:.2}\u{00b0}{}, {:.2}\u{00b0}{} at zoom {:.1}",
        camera.center.lat.abs(),
        if camera.center.lat >= 0.0 { "N" } else { "S" },
        camera.center.lon.abs(),
        if camera.center.lon >= 0.0 { "E" } else { "W" },
        camera.zoom,
    );
    Ok(())
}
