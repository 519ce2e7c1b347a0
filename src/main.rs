//! CLI entry point for the gas price map tool.
//!
//! Provides subcommands for finding the cheapest stations around a zip code,
//! listing neighboring zip codes and dumping a raw API response.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gas_price_map::{
    config::Settings,
    dashboard::{Dashboard, DashboardRequest, DashboardResponse},
    fetch::{BasicClient, StaticHeaders, fetch_stations},
    geo::{DEFAULT_RADIUS_MILES, GeometryIndex, neighboring_zips},
    output::{
        append_records, print_json, print_pretty, render_cheapest_table, render_station_table,
        write_json,
    },
    types::FuelProduct,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gas_price_map")]
#[command(about = "Find the cheapest gas around a zip code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices for a zip code and its neighbors and show the cheapest stations
    Cheapest {
        /// Zip code to search around
        #[arg(value_name = "ZIP")]
        zip: String,

        /// GeoJSON zip boundary files
        #[arg(short, long = "geojson", value_name = "FILE", required = true, num_args = 1..)]
        geojson: Vec<PathBuf>,

        /// Neighbor search radius in miles
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_MILES, value_parser = parse_radius)]
        radius: f64,

        /// Maximum number of concurrent zip code fetches
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        /// Fuel product to compare
        #[arg(short, long, value_enum, default_value_t = FuelProduct::RegularGas)]
        fuel: FuelProduct,

        /// CSV file to append every matching station to
        #[arg(long)]
        csv: Option<String>,

        /// JSON file to write the map layers to
        #[arg(long)]
        layers: Option<String>,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List zip codes within the search radius of a zip code
    Neighbors {
        #[arg(value_name = "ZIP")]
        zip: String,

        /// GeoJSON zip boundary files
        #[arg(short, long = "geojson", value_name = "FILE", required = true, num_args = 1..)]
        geojson: Vec<PathBuf>,

        /// Neighbor search radius in miles
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_MILES, value_parser = parse_radius)]
        radius: f64,
    },
    /// Print the raw API response for a single zip code
    Fetch {
        #[arg(value_name = "ZIP")]
        zip: String,
    },
}

/// Accepts a finite, non-negative number of miles.
fn parse_radius(value: &str) -> Result<f64, String> {
    let miles: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !miles.is_finite() || miles < 0.0 {
        return Err(format!("radius must be a finite number of miles >= 0, got {value}"));
    }
    Ok(miles)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gas_price_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cheapest {
            zip,
            geojson,
            radius,
            concurrency,
            fuel,
            csv,
            layers,
            json,
        } => {
            let geometry = GeometryIndex::load(&geojson, &settings.zip_property)?;
            let client = StaticHeaders::user_agent(BasicClient::new(), &settings.user_agent)?;
            let dashboard = Dashboard::new(client, settings.endpoint.clone(), geometry)
                .with_fuel(fuel)
                .with_radius(radius)
                .with_concurrency(concurrency);

            match dashboard.respond(&DashboardRequest::fetch(&zip)).await {
                DashboardResponse::Idle => info!("No fetch requested"),
                DashboardResponse::UnknownZip { zip } => {
                    warn!(zip = %zip, "Zip code is not in the loaded boundary files");
                }
                DashboardResponse::Ready(report) => {
                    for (zip, records) in &report.stations {
                        println!("{}", render_station_table(zip, records));
                    }
                    println!("{}", render_cheapest_table(&report.cheapest));

                    if let Some(range) = report.price_range {
                        info!(min = range.min, max = range.max, "Price range");
                    }
                    if let Some(path) = csv {
                        let records: Vec<_> = report.stations.values().flatten().cloned().collect();
                        append_records(&path, &records)?;
                        info!(path = %path, rows = records.len(), "Stations appended");
                    }
                    if let Some(path) = layers {
                        write_json(&path, &report.layers)?;
                        info!(path = %path, "Map layers written");
                    }

                    print_pretty(&report);
                    if json {
                        print_json(&report)?;
                    }
                }
            }
        }
        Commands::Neighbors {
            zip,
            geojson,
            radius,
        } => {
            let geometry = GeometryIndex::load(&geojson, &settings.zip_property)?;

            match neighboring_zips(&geometry, zip.trim(), radius) {
                Some(neighbors) => {
                    for n in &neighbors {
                        println!("{:<6} {:>6.2} mi", n.zip, n.distance_miles);
                    }
                    info!(count = neighbors.len(), radius, "Neighbors listed");
                }
                None => warn!(zip = %zip, "Zip code is not in the loaded boundary files"),
            }
        }
        Commands::Fetch { zip } => {
            let client = StaticHeaders::user_agent(BasicClient::new(), &settings.user_agent)?;

            match fetch_stations(&client, &settings.endpoint, zip.trim()).await? {
                Some(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                None => warn!(zip = %zip, "No data returned"),
            }
        }
    }

    Ok(())
}
