//! Spatial partitioning of a point set into size-bounded clusters, and the
//! macro visiting order of those clusters.

use crate::geodesic::{geodesic_m, mean_point};
use crate::kmeans::{self, KMeans};

/// A group of indices into the original point list.
///
/// After [`partition`] every cluster holds between one and
/// `max_cluster_size` members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    members: Vec<usize>,
}

impl Cluster {
    pub fn new(members: Vec<usize>) -> Self {
        Self { members }
    }

    /// A single cluster holding `0..len` in order.
    pub fn all(len: usize) -> Self {
        Self {
            members: (0..len).collect(),
        }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Mean (lat, lon) of the members. Planar mean, not geodesic.
    pub fn centroid(&self, points: &[(f64, f64)]) -> Option<(f64, f64)> {
        mean_point(self.members.iter().map(|&i| points[i]))
    }
}

/// k-means settings used by [`partition_with`].
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            seed: kmeans::DEFAULT_SEED,
            max_iterations: kmeans::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Splits `points` into clusters of at most `max_cluster_size` members.
pub fn partition(points: &[(f64, f64)], max_cluster_size: usize) -> Vec<Cluster> {
    partition_with(points, max_cluster_size, &PartitionOptions::default())
}

pub fn partition_with(
    points: &[(f64, f64)],
    max_cluster_size: usize,
    options: &PartitionOptions,
) -> Vec<Cluster> {
    debug_assert!(max_cluster_size > 0, "max_cluster_size must be > 0");
    let max_cluster_size = max_cluster_size.max(1);

    if points.is_empty() {
        return Vec::new();
    }
    if points.len() <= max_cluster_size {
        return vec![Cluster::all(points.len())];
    }

    let k = points.len().div_ceil(max_cluster_size);
    // k-means runs on the raw lon/lat plane
    let coords: Vec<[f64; 2]> = points.iter().map(|&(lat, lon)| [lon, lat]).collect();
    let labels = KMeans::new(k)
        .seed(options.seed)
        .max_iterations(options.max_iterations)
        .fit_predict(&coords);

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (idx, label) in labels.into_iter().enumerate() {
        groups[label].push(idx);
    }

    let clusters = enforce_max_cluster_size(groups, max_cluster_size);
    tracing::debug!(
        points = points.len(),
        k,
        clusters = clusters.len(),
        "partitioned point set"
    );
    clusters
}

/// Splits every group above `max_cluster_size` into consecutive chunks and
/// drops empty groups.
pub fn enforce_max_cluster_size(groups: Vec<Vec<usize>>, max_cluster_size: usize) -> Vec<Cluster> {
    let max_cluster_size = max_cluster_size.max(1);
    let mut clusters = Vec::with_capacity(groups.len());
    for group in groups {
        if group.len() > max_cluster_size {
            clusters.extend(group.chunks(max_cluster_size).map(|chunk| Cluster::new(chunk.to_vec())));
        } else if !group.is_empty() {
            clusters.push(Cluster::new(group));
        }
    }
    clusters
}

/// Orders cluster indices by geodesic distance from `start` to each centroid.
///
/// Stable: equal distances keep the original cluster order.
pub fn order_clusters(start: (f64, f64), clusters: &[Cluster], points: &[(f64, f64)]) -> Vec<usize> {
    let distances: Vec<f64> = clusters
        .iter()
        .map(|cluster| {
            cluster
                .centroid(points)
                .map(|centroid| geodesic_m(start, centroid))
                .unwrap_or(f64::INFINITY)
        })
        .collect();

    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
    order
}
