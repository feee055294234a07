//! Command-line front end: plans a route over a JSON file of profiles.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use visit_route_planner::error::{PlannerError, Result};
use visit_route_planner::ors::{OrsClient, OrsConfig};
use visit_route_planner::profile::InMemoryProfileStore;
use visit_route_planner::{CancellationToken, OptimizeRequest, PlannerConfig, optimize_profiles};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON array of profile records
    #[arg(long)]
    profiles: PathBuf,

    /// Start latitude
    #[arg(long, allow_hyphen_values = true)]
    start_lat: f64,

    /// Start longitude
    #[arg(long, allow_hyphen_values = true)]
    start_lon: f64,

    /// Profile filter as key=value, repeatable
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Maximum jobs per optimizer request
    #[arg(long, default_value_t = 60)]
    max_cluster_size: usize,

    /// Maximum routable profiles per request
    #[arg(long, default_value_t = 45)]
    max_input: usize,

    /// Concurrent optimizer calls
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Return to the start after the last stop
    #[arg(long)]
    loop_at_start: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visit_route_planner=info")))
        .init();

    let args = Args::parse();

    let mut request = OptimizeRequest::new(args.start_lat, args.start_lon);
    for pair in &args.filters {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| PlannerError::invalid_filter_value(pair.as_str(), "expected key=value"))?;
        request = request.filter(key.trim(), value.trim());
    }

    let mut config = PlannerConfig {
        max_cluster_size: args.max_cluster_size,
        max_input_profiles: args.max_input,
        optimizer_workers: args.workers,
        ..PlannerConfig::default()
    };
    config.vehicle.loop_at_start = args.loop_at_start;

    let store = InMemoryProfileStore::from_json_file(&args.profiles)?;
    tracing::info!(profiles = store.len(), path = %args.profiles.display(), "loaded profiles");

    let client = OrsClient::new(OrsConfig::from_env()?)?;
    let response = optimize_profiles(&request, &store, &client, &client, &config, &CancellationToken::new())?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
