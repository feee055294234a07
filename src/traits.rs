//! Seams between the routing engine and its collaborators.
//!
//! The engine only needs three things from the outside world: a record store
//! to query, a job optimizer to order the stops of one cluster, and a
//! directions service to draw the road path. Concrete apps and tests
//! implement these for their own backends.

use crate::error::{Result, UpstreamError};
use crate::ors::{DirectionsRequest, DirectionsResponse, OptimizationRequest, OptimizationResponse};
use crate::profile::{Profile, ProfileFilter, ProfileId};

/// Supplies profile records.
pub trait ProfileStore {
    /// Profiles matching `filter`, sorted by id. No matches is an empty vec.
    fn query(&self, filter: &ProfileFilter) -> Result<Vec<Profile>>;

    /// Bulk lookup of the given ids. Unknown ids are absent from the result.
    fn profiles_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>>;
}

/// Orders the jobs of a single optimization request.
///
/// Coordinates in the request and response are `[lon, lat]`.
pub trait JobOptimizer: Sync {
    fn optimize(&self, request: &OptimizationRequest) -> std::result::Result<OptimizationResponse, UpstreamError>;
}

/// Produces road-following geometry through an ordered list of coordinates.
pub trait DirectionsProvider {
    fn directions(&self, request: &DirectionsRequest) -> std::result::Result<DirectionsResponse, UpstreamError>;
}
