//! Builds the routable point set from profile records.

use crate::error::{PlannerError, Result};
use crate::geodesic::is_valid_coordinate;
use crate::profile::{Profile, ProfileId};

/// Parallel arrays: `points[i]` is the (lat, lon) of profile `ids[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<(f64, f64)>,
    ids: Vec<ProfileId>,
}

impl PointSet {
    /// Keeps every profile with both coordinates, in input order.
    ///
    /// Missing coordinates are skipped; present but out-of-range ones are an
    /// input error.
    pub fn from_profiles(profiles: &[Profile]) -> Result<Self> {
        let mut set = Self::default();
        for profile in profiles {
            let Some((lat, lon)) = profile.coordinates() else {
                continue;
            };
            if !is_valid_coordinate(lat, lon) {
                return Err(PlannerError::InvalidCoordinate { lat, lon });
            }
            set.points.push((lat, lon));
            set.ids.push(profile.id);
        }
        Ok(set)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn ids(&self) -> &[ProfileId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keeps the first `max` entries.
    pub fn truncate(&mut self, max: usize) {
        self.points.truncate(max);
        self.ids.truncate(max);
    }

    /// Points and ids at the given indices, in index order.
    pub fn select(&self, indices: &[usize]) -> (Vec<(f64, f64)>, Vec<ProfileId>) {
        indices.iter().map(|&i| (self.points[i], self.ids[i])).unzip()
    }
}
