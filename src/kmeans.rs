//! Seeded k-means over planar `[x, y]` coordinates.
//!
//! k-means++ seeding followed by Lloyd iterations. The same seed and input
//! always produce the same labels.

use rand::{Rng, SeedableRng, rngs::SmallRng};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;

#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    seed: u64,
    max_iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Assigns every coordinate a label in `0..k`.
    ///
    /// Labels may leave some groups empty when the input has many duplicate
    /// coordinates; callers drop empty groups.
    pub fn fit_predict(&self, coords: &[[f64; 2]]) -> Vec<usize> {
        if coords.is_empty() || self.k == 0 {
            return Vec::new();
        }
        if self.k >= coords.len() {
            return (0..coords.len()).collect();
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut centers = self.initial_centers(coords, &mut rng);
        let mut labels = vec![usize::MAX; coords.len()];

        for iteration in 0..self.max_iterations {
            let mut changed = false;
            for (i, coord) in coords.iter().enumerate() {
                let nearest = nearest_center(coord, &centers);
                if labels[i] != nearest {
                    labels[i] = nearest;
                    changed = true;
                }
            }

            if !changed {
                tracing::debug!(iterations = iteration, k = self.k, "kmeans converged");
                break;
            }

            let mut sums = vec![[0.0, 0.0]; self.k];
            let mut counts = vec![0usize; self.k];
            for (coord, &label) in coords.iter().zip(&labels) {
                sums[label][0] += coord[0];
                sums[label][1] += coord[1];
                counts[label] += 1;
            }
            for j in 0..self.k {
                if counts[j] > 0 {
                    centers[j] = [sums[j][0] / counts[j] as f64, sums[j][1] / counts[j] as f64];
                }
            }
        }

        labels
    }

    /// k-means++: first center uniform, then proportional to squared distance.
    fn initial_centers(&self, coords: &[[f64; 2]], rng: &mut SmallRng) -> Vec<[f64; 2]> {
        let mut centers = Vec::with_capacity(self.k);
        centers.push(coords[rng.gen_range(0..coords.len())]);

        let mut min_dist: Vec<f64> = coords.iter().map(|c| squared_distance(c, &centers[0])).collect();

        while centers.len() < self.k {
            let total: f64 = min_dist.iter().sum();
            let next = if total > 0.0 {
                let mut target = rng.gen_range(0.0..total);
                let mut chosen = coords.len() - 1;
                for (i, weight) in min_dist.iter().enumerate() {
                    if target < *weight {
                        chosen = i;
                        break;
                    }
                    target -= weight;
                }
                chosen
            } else {
                // all remaining points coincide with a center
                rng.gen_range(0..coords.len())
            };

            let center = coords[next];
            for (dist, coord) in min_dist.iter_mut().zip(coords) {
                *dist = dist.min(squared_distance(coord, &center));
            }
            centers.push(center);
        }

        centers
    }
}

fn nearest_center(coord: &[f64; 2], centers: &[[f64; 2]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (j, center) in centers.iter().enumerate() {
        let dist = squared_distance(coord, center);
        if dist < best_dist {
            best_dist = dist;
            best = j;
        }
    }
    best
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}
