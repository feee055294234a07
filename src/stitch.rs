//! Stitches per-cluster orders into one global visiting sequence.

use crate::optimizer::{ClusterOutcome, ClusterRoute};
use crate::profile::ProfileId;

/// Start point followed by every routed stop, in cluster visiting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchedRoute {
    /// `points[0]` is the start; `points[k]` is the stop of `ids()[k - 1]`.
    pub points: Vec<(f64, f64)>,
    /// Routed clusters in visiting order.
    pub clusters: Vec<ClusterRoute>,
    /// Points dropped because their cluster failed.
    pub skipped: usize,
}

impl StitchedRoute {
    pub fn start(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    /// Routed stops, start excluded.
    pub fn stops(&self) -> &[(f64, f64)] {
        self.points.get(1..).unwrap_or_default()
    }

    pub fn ids(&self) -> impl Iterator<Item = ProfileId> + '_ {
        self.clusters.iter().flat_map(|cluster| cluster.ids.iter().copied())
    }

    pub fn stop_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.stop_count() == 0
    }
}

/// Concatenates `[start] + cluster_1 + cluster_2 + ...` from outcomes already
/// in visiting order. Failed clusters add to the skip count.
pub fn stitch(start: (f64, f64), outcomes: Vec<ClusterOutcome>) -> StitchedRoute {
    let mut stitched = StitchedRoute {
        points: vec![start],
        ..StitchedRoute::default()
    };

    for outcome in outcomes {
        let route = match outcome.result {
            Ok(route) => route,
            Err(err) => {
                tracing::warn!(cluster = outcome.cluster, size = outcome.size, error = %err, "skipping cluster");
                stitched.skipped += outcome.size;
                continue;
            }
        };

        debug_assert!(
            route.is_aligned(),
            "cluster {} has {} points but {} ids",
            outcome.cluster,
            route.points.len(),
            route.ids.len()
        );
        if !route.is_aligned() {
            tracing::error!(
                cluster = outcome.cluster,
                points = route.points.len(),
                ids = route.ids.len(),
                "misaligned cluster route, skipping"
            );
            stitched.skipped += outcome.size;
            continue;
        }

        // stops the optimizer left out of an otherwise good cluster
        stitched.skipped += outcome.size.saturating_sub(route.len());
        stitched.points.extend_from_slice(&route.points);
        stitched.clusters.push(route);
    }

    if stitched.skipped > 0 {
        tracing::warn!(skipped = stitched.skipped, "points skipped due to optimizer failures or missing steps");
    }
    tracing::info!(
        stops = stitched.stop_count(),
        clusters = stitched.clusters.len(),
        "stitched route"
    );
    stitched
}
