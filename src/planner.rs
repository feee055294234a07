//! Route planning pipeline.
//!
//! filter -> point set -> partition -> sequence -> optimize -> stitch -> assemble

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cluster::{self, Cluster, PartitionOptions};
use crate::display::{self, DisplayPayload};
use crate::error::{PlannerError, Result};
use crate::geodesic::is_valid_coordinate;
use crate::kmeans;
use crate::optimizer::{self, VehicleOptions};
use crate::points::PointSet;
use crate::profile::ProfileFilter;
use crate::stitch;
use crate::traits::{DirectionsProvider, JobOptimizer, ProfileStore};

pub const NO_MATCHING_PROFILES: &str = "No matching profiles found.";
pub const NO_VALID_COORDINATES: &str = "No profiles with valid coordinates.";
pub const NO_ROUTE: &str = "No route could be computed.";

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Upper bound on jobs per optimizer request.
    pub max_cluster_size: usize,
    /// Point sets at or below this size skip partitioning.
    pub cluster_threshold: usize,
    /// Routable points kept per request.
    pub max_input_profiles: usize,
    /// Concurrent optimizer calls.
    pub optimizer_workers: usize,
    pub kmeans_seed: u64,
    pub kmeans_max_iterations: usize,
    pub vehicle: VehicleOptions,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: 60,
            cluster_threshold: 30,
            max_input_profiles: 45,
            optimizer_workers: 4,
            kmeans_seed: kmeans::DEFAULT_SEED,
            kmeans_max_iterations: kmeans::DEFAULT_MAX_ITERATIONS,
            vehicle: VehicleOptions::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_cluster_size == 0 {
            return Err(PlannerError::invalid_config("max_cluster_size must be > 0"));
        }
        if self.max_input_profiles == 0 {
            return Err(PlannerError::invalid_config("max_input_profiles must be > 0"));
        }
        if self.optimizer_workers == 0 {
            return Err(PlannerError::invalid_config("optimizer_workers must be > 0"));
        }
        Ok(())
    }

    fn partition_options(&self) -> PartitionOptions {
        PartitionOptions {
            seed: self.kmeans_seed,
            max_iterations: self.kmeans_max_iterations,
        }
    }
}

/// Shared flag a caller sets to abort an in-flight request.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub start_lat: f64,
    pub start_lon: f64,
    #[serde(default)]
    pub filters: Map<String, Value>,
}

impl OptimizeRequest {
    pub fn new(start_lat: f64, start_lon: f64) -> Self {
        Self {
            start_lat,
            start_lon,
            filters: Map::new(),
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn start(&self) -> (f64, f64) {
        (self.start_lat, self.start_lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptimizeResponse {
    Message { message: String },
    Route(DisplayPayload),
}

impl OptimizeResponse {
    pub fn message(message: &str) -> Self {
        OptimizeResponse::Message {
            message: message.to_string(),
        }
    }

    pub fn payload(&self) -> Option<&DisplayPayload> {
        match self {
            OptimizeResponse::Route(payload) => Some(payload),
            OptimizeResponse::Message { .. } => None,
        }
    }
}

/// Plans a visiting route for the profiles matching `request.filters`.
///
/// Input errors abort the request. Optimizer failures only drop the affected
/// cluster; if every cluster fails the response is [`NO_ROUTE`].
pub fn optimize_profiles<S, O, D>(
    request: &OptimizeRequest,
    store: &S,
    optimizer: &O,
    directions: &D,
    config: &PlannerConfig,
    cancel: &CancellationToken,
) -> Result<OptimizeResponse>
where
    S: ProfileStore + ?Sized,
    O: JobOptimizer + ?Sized,
    D: DirectionsProvider + ?Sized,
{
    config.validate()?;
    let start = request.start();
    if !is_valid_coordinate(start.0, start.1) {
        return Err(PlannerError::InvalidCoordinate {
            lat: start.0,
            lon: start.1,
        });
    }
    let filter = ProfileFilter::from_json(&request.filters)?;
    cancel.check()?;

    let mut profiles = store.query(&filter)?;
    if profiles.is_empty() {
        tracing::info!("no profiles match the filters");
        return Ok(OptimizeResponse::message(NO_MATCHING_PROFILES));
    }
    profiles.sort_by_key(|profile| profile.id);

    let mut point_set = PointSet::from_profiles(&profiles)?;
    if point_set.is_empty() {
        tracing::info!(profiles = profiles.len(), "no profile has coordinates");
        return Ok(OptimizeResponse::message(NO_VALID_COORDINATES));
    }
    if point_set.len() > config.max_input_profiles {
        tracing::info!(
            points = point_set.len(),
            max = config.max_input_profiles,
            "truncating candidate set"
        );
        point_set.truncate(config.max_input_profiles);
    }

    let clusters = plan_clusters(&point_set, config);
    let order = cluster::order_clusters(start, &clusters, point_set.points());
    tracing::info!(points = point_set.len(), clusters = clusters.len(), "optimizing clusters");

    let outcomes = optimizer::optimize_in_order(optimizer, start, &point_set, &clusters, &order, config, cancel)?;
    let stitched = stitch::stitch(start, outcomes);
    if stitched.is_empty() {
        tracing::warn!(skipped = stitched.skipped, "every cluster failed");
        return Ok(OptimizeResponse::message(NO_ROUTE));
    }

    cancel.check()?;
    let payload = display::assemble(&stitched, store, directions)?;
    cancel.check()?;

    Ok(match payload {
        Some(payload) => OptimizeResponse::Route(payload),
        None => OptimizeResponse::message(NO_ROUTE),
    })
}

/// Clusters the point set, or keeps it whole below the threshold.
///
/// The threshold never lets a single cluster exceed `max_cluster_size`.
pub fn plan_clusters(point_set: &PointSet, config: &PlannerConfig) -> Vec<Cluster> {
    if point_set.len() <= config.cluster_threshold.min(config.max_cluster_size) {
        tracing::debug!(points = point_set.len(), "small batch, single cluster");
        return vec![Cluster::all(point_set.len())];
    }
    cluster::partition_with(point_set.points(), config.max_cluster_size, &config.partition_options())
}
