use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use formats::features::FrontlineSnapshot;
use formats::records::{
    FrontlineRegistry, build_globe_conflicts, conflict_records_from_values,
    parse_conflict_records,
};
use formats::topology::{DecodedTopology, decode_countries_str};
use foundation::math::LatLng;
use foundation::time::Time;
use globe::{DataRequest, GlobeConfig, GlobeEvent, GlobeViewer};
use gpu::{HeadlessBackend, Rgb};
use layers::FrontlineOverlay;
use reqwest::Client;
use scene::SceneGraph;
use scene::spatial::CountryLocator;
use serde_json::json;
use streaming::FetchError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const SIM_STEP_S: f64 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Conflict globe engine tools")]
struct Args {
    /// Engine config JSON (default: $GLOBE_CONFIG, else built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a border topology and report what was kept
    Decode {
        topology: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the country containing a point
    Locate {
        topology: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Triangulate a frontline FeatureCollection and print its legend
    Triangulate {
        features: PathBuf,

        /// Snapshot date to label the output with
        #[arg(long, default_value = "snapshot")]
        date: String,
    },

    /// Run the viewer headless over local data
    Simulate {
        topology: PathBuf,

        /// Conflict records served for every requested year
        #[arg(long)]
        conflicts: PathBuf,

        /// Frontline-capable conflict registry
        #[arg(long)]
        registry: Option<PathBuf>,

        #[arg(long, default_value_t = 600)]
        frames: u32,

        /// Start timeline playback before the first frame
        #[arg(long)]
        play: bool,
    },

    /// Fetch one year of conflicts from the data service
    Fetch {
        #[arg(long, allow_negative_numbers = true)]
        year: i32,

        /// Base API URL (default: $GLOBE_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Decode { topology, json } => cmd_decode(&topology, json),
        Command::Locate { topology, lat, lng } => cmd_locate(&topology, lat, lng),
        Command::Triangulate { features, date } => cmd_triangulate(&features, &date),
        Command::Simulate {
            topology,
            conflicts,
            registry,
            frames,
            play,
        } => cmd_simulate(config, &topology, &conflicts, registry.as_deref(), frames, play),
        Command::Fetch { year, api_url } => {
            let api_url = api_url.unwrap_or_else(|| {
                env::var("GLOBE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            });
            cmd_fetch(&config, &api_url, year).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GlobeConfig, String> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match env::var("GLOBE_CONFIG") {
            Ok(p) => PathBuf::from(p),
            Err(_) => return Ok(GlobeConfig::default()),
        },
    };
    let text = read(&path)?;
    GlobeConfig::from_json_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))
}

fn decode(path: &Path) -> Result<DecodedTopology, String> {
    decode_countries_str(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

fn cmd_decode(path: &Path, as_json: bool) -> Result<(), String> {
    let decoded = decode(path)?;
    let rings: usize = decoded.countries.iter().map(|c| c.rings.len()).sum();
    let points: usize = decoded.countries.iter().map(|c| c.point_count()).sum();
    let r = &decoded.report;

    if as_json {
        let summary = json!({
            "countries": decoded.countries.len(),
            "rings": rings,
            "points": points,
            "skipped_records": r.skipped_records,
            "skipped_arc_refs": r.skipped_arc_refs,
            "dropped_rings": r.dropped_rings,
            "unsupported_geometries": r.unsupported_geometries,
        });
        let text = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    println!("countries:              {}", decoded.countries.len());
    println!("rings:                  {rings}");
    println!("points:                 {points}");
    println!("skipped records:        {}", r.skipped_records);
    println!("skipped arc refs:       {}", r.skipped_arc_refs);
    println!("dropped rings:          {}", r.dropped_rings);
    println!("unsupported geometries: {}", r.unsupported_geometries);
    Ok(())
}

fn cmd_locate(path: &Path, lat: f64, lng: f64) -> Result<(), String> {
    if !LatLng::new(lat, lng).is_valid() {
        return Err(format!("({lat}, {lng}) is not a valid coordinate"));
    }
    let countries = decode(path)?.countries;
    let locator = CountryLocator::new(&countries);
    match locator.locate(&countries, [lng, lat]) {
        Some(country) => println!("{}\t{}", country.id, country.name),
        None => println!("no country at ({lat}, {lng})"),
    }
    Ok(())
}

fn cmd_triangulate(path: &Path, date: &str) -> Result<(), String> {
    let snapshot = FrontlineSnapshot::from_geojson_str(date, &read(path)?)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    let mut gpu = HeadlessBackend::new();
    let mut graph = SceneGraph::new();
    let overlay =
        FrontlineOverlay::build(&snapshot, &mut graph, &mut gpu).map_err(|e| e.to_string())?;

    let stats = overlay.stats();
    println!(
        "{date}: {} polygons, {} lines, {} points, {} triangles",
        stats.polygons, stats.lines, stats.points, stats.triangles
    );
    if stats.rejected_records > 0 {
        println!("rejected while parsing: {}", stats.rejected_records);
    }
    for skipped in &stats.skipped {
        println!("skipped feature {}: {}", skipped.index, skipped.reason);
    }
    for entry in overlay.legend() {
        println!("{}\t{}\t{}", hex(entry.color), entry.side, entry.label);
    }

    overlay
        .dispose(&mut graph, &mut gpu)
        .map_err(|e| e.to_string())
}

fn cmd_simulate(
    config: GlobeConfig,
    topology: &Path,
    conflicts: &Path,
    registry: Option<&Path>,
    frames: u32,
    play: bool,
) -> Result<(), String> {
    let topology = read(topology)?;
    let parsed = parse_conflict_records(&read(conflicts)?)
        .map_err(|e| format!("{}: {e}", conflicts.display()))?;
    if !parsed.rejected.is_empty() {
        warn!(rejected = parsed.rejected.len(), "conflict records skipped");
    }
    let records = parsed.records;

    let mut viewer = GlobeViewer::new(config, HeadlessBackend::new(), 1280, 720, Time(0.0))
        .map_err(|e| e.to_string())?;
    let first_year = viewer.config().timeline.min_year;
    let report = viewer
        .load_borders(first_year, &topology)
        .map_err(|e| e.to_string())?;
    info!(?report, "borders loaded");

    if let Some(path) = registry {
        let registry = FrontlineRegistry::from_json_str(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        viewer.set_frontline_registry(registry);
    }
    if play {
        viewer.play();
    }

    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut t = 0.0;
    for _ in 0..frames {
        t += SIM_STEP_S;
        viewer.frame(Time(t), SIM_STEP_S).map_err(|e| e.to_string())?;

        while let Some(request) = viewer.next_fetch() {
            match request {
                DataRequest::Conflicts { request, year } => {
                    info!(year, "serving conflicts");
                    viewer.complete_conflicts(request, Ok(records.clone()));
                }
                DataRequest::Frontlines { request, key } => {
                    warn!(%key, "no frontline data in simulation");
                    viewer.complete_frontlines(request, Err(FetchError::Status(404)));
                }
            }
        }
        for stamped in viewer.drain_events() {
            *tally.entry(event_name(&stamped.event)).or_default() += 1;
        }
    }

    println!("frames:       {}", viewer.frame_index());
    println!("year:         {}", viewer.state().year);
    println!("markers:      {}", viewer.markers().map_or(0, |m| m.len()));
    println!("scene nodes:  {}", viewer.graph().node_count());
    println!("draw calls:   {}", viewer.gpu().last_frame().draws.len());
    println!("cached years: {}", viewer.conflict_cache_len());
    for (name, count) in &tally {
        println!("event {name}: {count}");
    }

    let gpu = viewer.teardown();
    println!(
        "after teardown: {} geometries, {} materials",
        gpu.live_geometries(),
        gpu.live_materials()
    );
    Ok(())
}

async fn cmd_fetch(config: &GlobeConfig, api_url: &str, year: i32) -> Result<(), String> {
    let url = format!("{}/conflicts/globe", api_url.trim_end_matches('/'));
    info!(%url, year, "fetching conflicts");

    let client = Client::new();
    let resp = client
        .get(&url)
        .query(&[("year", year)])
        .send()
        .await
        .map_err(|e| format!("GET {url}: {e}"))?;
    if !resp.status().is_success() {
        return Err(format!("GET {url}: status {}", resp.status()));
    }
    let values: Vec<serde_json::Value> = resp
        .json()
        .await
        .map_err(|e| format!("decode {url}: {e}"))?;
    let parsed = conflict_records_from_values(values);
    if !parsed.rejected.is_empty() {
        println!("{} malformed records skipped", parsed.rejected.len());
    }
    let records = parsed.records;

    let conflicts = build_globe_conflicts(
        &records,
        year,
        config.timeline.present_year,
        &FrontlineRegistry::default(),
    );
    println!("{} of {} records active in {year}", conflicts.len(), records.len());
    for c in &conflicts {
        println!(
            "{}\t{:>8.3} {:>8.3}\t{:?}\t{}",
            c.id, c.position.lat, c.position.lng, c.intensity, c.name
        );
    }
    Ok(())
}

fn event_name(event: &GlobeEvent) -> &'static str {
    match event {
        GlobeEvent::Navigate(_) => "navigate",
        GlobeEvent::Tooltip(_) => "tooltip",
        GlobeEvent::LoadState { .. } => "load_state",
        GlobeEvent::YearChanged(_) => "year_changed",
        GlobeEvent::Legend(_) => "legend",
        GlobeEvent::FilterMatches(_) => "filter_matches",
        GlobeEvent::SurfaceLost => "surface_lost",
    }
}

fn hex(color: Rgb) -> String {
    let [r, g, b] = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}
