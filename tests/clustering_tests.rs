//! Partition, sequencing and stitching over realistic Montreal point sets.

mod fixtures;

use std::collections::HashSet;

use visit_route_planner::cluster::{self, Cluster, order_clusters};
use visit_route_planner::optimizer::optimize_in_order;
use visit_route_planner::planner::plan_clusters;
use visit_route_planner::points::PointSet;
use visit_route_planner::stitch::stitch;
use visit_route_planner::{CancellationToken, PlannerConfig};

use fixtures::{LAVAL, MockOptimizer, NDG, PLATEAU, START, blob, has_job_near, profiles_at, spread};

fn three_blobs() -> PointSet {
    let mut profiles = profiles_at(&blob(&NDG, 20), 1000);
    profiles.extend(profiles_at(&blob(&PLATEAU, 20), 2000));
    profiles.extend(profiles_at(&blob(&LAVAL, 20), 3000));
    PointSet::from_profiles(&profiles).unwrap()
}

fn covers_every_index_once(clusters: &[Cluster], n: usize) -> bool {
    let mut seen = HashSet::new();
    let all_unique = clusters.iter().flat_map(|c| c.members()).all(|&i| seen.insert(i));
    all_unique && seen.len() == n && seen.iter().all(|&i| i < n)
}

#[test]
fn ninety_points_respect_cap_of_fifty() {
    let points = spread(90);
    let clusters = cluster::partition(&points, 50);

    assert!(clusters.len() >= 2);
    assert!(clusters.iter().all(|c| !c.is_empty() && c.len() <= 50));
    assert!(covers_every_index_once(&clusters, 90));
}

#[test]
fn separated_neighbourhoods_become_clusters() {
    let point_set = three_blobs();
    let config = PlannerConfig {
        max_cluster_size: 20,
        ..PlannerConfig::default()
    };

    let clusters = plan_clusters(&point_set, &config);
    assert_eq!(clusters.len(), 3);
    for cluster in &clusters {
        let blocks: HashSet<i64> = cluster.members().iter().map(|&i| point_set.ids()[i] / 1000).collect();
        assert_eq!(blocks.len(), 1, "cluster mixes neighbourhoods: {blocks:?}");
    }
}

#[test]
fn sequence_starts_with_nearest_neighbourhood() {
    let point_set = three_blobs();
    let clusters = cluster::partition(point_set.points(), 20);
    let order = order_clusters(START.coords(), &clusters, point_set.points());

    let first_ids: Vec<i64> = order
        .iter()
        .map(|&c| point_set.ids()[clusters[c].members()[0]] / 1000)
        .collect();
    assert_eq!(first_ids, vec![1, 2, 3]);
}

#[test]
fn partition_is_deterministic() {
    let points = spread(90);
    assert_eq!(cluster::partition(&points, 25), cluster::partition(&points, 25));
}

#[test]
fn failed_cluster_leaves_remaining_sequence_intact() {
    let point_set = three_blobs();
    let config = PlannerConfig {
        max_cluster_size: 20,
        ..PlannerConfig::default()
    };
    let start = START.coords();
    let optimizer = MockOptimizer::in_order().failing_when(|req| has_job_near(req, PLATEAU.coords(), 0.01));

    let clusters = plan_clusters(&point_set, &config);
    let order = order_clusters(start, &clusters, point_set.points());
    let outcomes = optimize_in_order(
        &optimizer,
        start,
        &point_set,
        &clusters,
        &order,
        &config,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes.iter().filter(|o| o.result.is_err()).count(), 1);

    let stitched = stitch(start, outcomes);
    assert_eq!(stitched.skipped, 20);
    assert_eq!(stitched.stop_count(), 40);
    assert_eq!(stitched.start(), Some(start));

    let blocks: Vec<i64> = stitched.ids().map(|id| id / 1000).collect();
    assert!(blocks[..20].iter().all(|&b| b == 1));
    assert!(blocks[20..].iter().all(|&b| b == 3));
}

#[test]
fn single_worker_pool_preserves_order() {
    let point_set = three_blobs();
    let config = PlannerConfig {
        max_cluster_size: 20,
        optimizer_workers: 1,
        ..PlannerConfig::default()
    };
    let start = START.coords();
    let optimizer = MockOptimizer::reversed();

    let clusters = plan_clusters(&point_set, &config);
    let order = order_clusters(start, &clusters, point_set.points());
    let outcomes = optimize_in_order(
        &optimizer,
        start,
        &point_set,
        &clusters,
        &order,
        &config,
        &CancellationToken::new(),
    )
    .unwrap();

    let visited: Vec<usize> = outcomes.iter().map(|o| o.cluster).collect();
    assert_eq!(visited, order);

    // reversed optimizer: the last member of each cluster is visited first
    let stitched = stitch(start, outcomes);
    let ids: Vec<i64> = stitched.ids().collect();
    let expected_first = point_set.ids()[*clusters[order[0]].members().last().unwrap()];
    assert_eq!(ids[0], expected_first);
}
