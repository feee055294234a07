//! Per-cluster job optimization.
//!
//! Each cluster becomes one optimization request. Jobs are numbered `1..=N`
//! in submission order and mapped back to profile ids when the response
//! arrives. A failed cluster never stops the others.

use rayon::prelude::*;

use crate::cluster::Cluster;
use crate::error::{PlannerError, Result, UpstreamError};
use crate::geodesic::to_lon_lat;
use crate::ors::{Job, OptimizationRequest, OptimizationResponse, StepKind, Vehicle};
use crate::planner::{CancellationToken, PlannerConfig};
use crate::points::PointSet;
use crate::profile::ProfileId;
use crate::traits::JobOptimizer;

const VEHICLE_ID: u64 = 1;

/// Maps optimizer job ids (1-based, submission order) to profile ids.
#[derive(Debug, Clone, PartialEq)]
pub struct JobIdMap {
    ids: Vec<ProfileId>,
}

impl JobIdMap {
    pub fn new(ids: &[ProfileId]) -> Self {
        Self { ids: ids.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Position of `job_id` in the submitted job list.
    pub fn index_of(&self, job_id: u64) -> Option<usize> {
        let index = usize::try_from(job_id).ok()?.checked_sub(1)?;
        (index < self.ids.len()).then_some(index)
    }

    pub fn profile_id(&self, job_id: u64) -> Option<ProfileId> {
        self.index_of(job_id).map(|index| self.ids[index])
    }

    /// Job ids in submission order.
    pub fn job_ids(&self) -> impl Iterator<Item = u64> {
        1..=self.ids.len() as u64
    }
}

/// Vehicle settings sent with every request.
#[derive(Debug, Clone)]
pub struct VehicleOptions {
    pub profile: String,
    /// Return to the start after the last stop.
    pub loop_at_start: bool,
}

impl Default for VehicleOptions {
    fn default() -> Self {
        Self {
            profile: crate::ors::DEFAULT_PROFILE.to_string(),
            loop_at_start: false,
        }
    }
}

/// The stops of one cluster in optimizer order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterRoute {
    pub points: Vec<(f64, f64)>,
    pub ids: Vec<ProfileId>,
}

impl ClusterRoute {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.points.len() == self.ids.len()
    }
}

/// Result of optimizing one cluster.
#[derive(Debug)]
pub struct ClusterOutcome {
    /// Index of the cluster in partition order.
    pub cluster: usize,
    /// Number of points submitted.
    pub size: usize,
    pub result: std::result::Result<ClusterRoute, UpstreamError>,
}

pub fn build_request(
    start: (f64, f64),
    points: &[(f64, f64)],
    job_ids: &JobIdMap,
    vehicle: &VehicleOptions,
) -> OptimizationRequest {
    let start = to_lon_lat(start);
    let jobs = job_ids
        .job_ids()
        .zip(points)
        .map(|(id, &point)| Job {
            id,
            location: to_lon_lat(point),
        })
        .collect();

    OptimizationRequest {
        jobs,
        vehicles: vec![Vehicle {
            id: VEHICLE_ID,
            start,
            profile: vehicle.profile.clone(),
            end: vehicle.loop_at_start.then_some(start),
        }],
    }
}

/// Optimizes one cluster and maps the job order back to points and ids.
pub fn optimize_cluster<O>(
    optimizer: &O,
    start: (f64, f64),
    points: &[(f64, f64)],
    ids: &[ProfileId],
    vehicle: &VehicleOptions,
) -> std::result::Result<ClusterRoute, UpstreamError>
where
    O: JobOptimizer + ?Sized,
{
    if points.len() != ids.len() {
        return Err(UpstreamError::Other(format!(
            "{} points but {} ids",
            points.len(),
            ids.len()
        )));
    }

    let job_ids = JobIdMap::new(ids);
    let request = build_request(start, points, &job_ids, vehicle);
    let response = optimizer.optimize(&request)?;
    read_job_order(response, points, &job_ids)
}

fn read_job_order(
    response: OptimizationResponse,
    points: &[(f64, f64)],
    job_ids: &JobIdMap,
) -> std::result::Result<ClusterRoute, UpstreamError> {
    let route = response
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(UpstreamError::MissingRoutes)?;

    let mut ordered = ClusterRoute::default();
    let mut seen = vec![false; job_ids.len()];
    for step in route.steps.iter().filter(|step| step.kind == StepKind::Job) {
        let Some(job_id) = step.job else {
            tracing::warn!("job step without a job id");
            continue;
        };
        let (Some(index), Some(profile_id)) = (job_ids.index_of(job_id), job_ids.profile_id(job_id)) else {
            tracing::warn!(job_id, jobs = job_ids.len(), "optimizer returned an unknown job id");
            continue;
        };
        if std::mem::replace(&mut seen[index], true) {
            tracing::warn!(job_id, profile_id, "optimizer returned a job twice");
            continue;
        }
        ordered.points.push(points[index]);
        ordered.ids.push(profile_id);
    }

    if ordered.is_empty() {
        return Err(UpstreamError::NoJobSteps);
    }
    Ok(ordered)
}

/// Optimizes clusters in `order` on a pool of `config.optimizer_workers` threads.
///
/// Outcomes come back in `order` regardless of completion order. The token
/// is checked before each call; a cancelled request yields
/// [`PlannerError::Cancelled`].
pub fn optimize_in_order<O>(
    optimizer: &O,
    start: (f64, f64),
    point_set: &PointSet,
    clusters: &[Cluster],
    order: &[usize],
    config: &PlannerConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ClusterOutcome>>
where
    O: JobOptimizer + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.optimizer_workers.max(1))
        .build()
        .map_err(|err| PlannerError::invalid_config(format!("optimizer pool: {err}")))?;

    let outcomes: Vec<Result<ClusterOutcome>> = pool.install(|| {
        order
            .par_iter()
            .map(|&cluster_idx| {
                cancel.check()?;
                let cluster = &clusters[cluster_idx];
                let (points, ids) = point_set.select(cluster.members());
                let result = optimize_cluster(optimizer, start, &points, &ids, &config.vehicle);
                if let Err(err) = &result {
                    tracing::warn!(cluster = cluster_idx, size = cluster.len(), error = %err, "cluster optimization failed");
                }
                Ok(ClusterOutcome {
                    cluster: cluster_idx,
                    size: cluster.len(),
                    result,
                })
            })
            .collect()
    });

    let outcomes = outcomes.into_iter().collect::<Result<Vec<_>>>()?;
    cancel.check()?;
    Ok(outcomes)
}
