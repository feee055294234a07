//! visit-route-planner
//!
//! Plans field-visit routes over geolocated profiles: partitions the points
//! into size-bounded clusters, orders each cluster with an external job
//! optimizer, and stitches the result into one road-following route.

pub mod error;
pub mod traits;
pub mod geodesic;
pub mod kmeans;
pub mod cluster;
pub mod profile;
pub mod points;
pub mod ors;
pub mod optimizer;
pub mod stitch;
pub mod polyline;
pub mod display;
pub mod planner;

pub use error::{PlannerError, Result, UpstreamError};
pub use planner::{optimize_profiles, CancellationToken, OptimizeRequest, OptimizeResponse, PlannerConfig};
