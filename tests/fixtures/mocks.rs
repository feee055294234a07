//! Mock external services.

use std::sync::Mutex;

use visit_route_planner::error::UpstreamError;
use visit_route_planner::ors::{
    DirectionsRequest, DirectionsResponse, Feature, OptimizationRequest, OptimizationResponse, Step,
};
use visit_route_planner::planner::CancellationToken;
use visit_route_planner::polyline::Polyline;
use visit_route_planner::traits::{DirectionsProvider, JobOptimizer};

type FailRule = Box<dyn Fn(&OptimizationRequest) -> bool + Send + Sync>;

/// Optimizer returning the submitted jobs in order (or reversed).
pub struct MockOptimizer {
    reverse: bool,
    fail_when: Option<FailRule>,
    cancel_on_call: Option<CancellationToken>,
    requests: Mutex<Vec<OptimizationRequest>>,
}

impl MockOptimizer {
    pub fn in_order() -> Self {
        Self {
            reverse: false,
            fail_when: None,
            cancel_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reversed() -> Self {
        Self {
            reverse: true,
            ..Self::in_order()
        }
    }

    pub fn failing_when<F>(mut self, rule: F) -> Self
    where
        F: Fn(&OptimizationRequest) -> bool + Send + Sync + 'static,
    {
        self.fail_when = Some(Box::new(rule));
        self
    }

    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub fn requests(&self) -> Vec<OptimizationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl JobOptimizer for MockOptimizer {
    fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResponse, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        if self.fail_when.as_ref().is_some_and(|rule| rule(request)) {
            return Err(UpstreamError::Status {
                status: 500,
                body: "mock failure".to_string(),
            });
        }

        let mut job_ids: Vec<u64> = request.jobs.iter().map(|job| job.id).collect();
        if self.reverse {
            job_ids.reverse();
        }

        let mut steps = vec![Step::start()];
        steps.extend(job_ids.into_iter().map(Step::job));
        steps.push(Step::end());
        Ok(OptimizationResponse::with_steps(steps))
    }
}

/// Directions service drawing straight segments through the requested points.
#[derive(Default)]
pub struct MockDirections {
    fail: bool,
    requests: Mutex<Vec<DirectionsRequest>>,
}

impl MockDirections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<DirectionsRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl DirectionsProvider for MockDirections {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(UpstreamError::Other("mock directions down".to_string()));
        }

        let points = request.coordinates.iter().map(|&[lon, lat]| (lat, lon)).collect();
        Ok(DirectionsResponse {
            features: vec![Feature {
                geometry: Polyline::new(points),
            }],
        })
    }
}

/// True when any job of `request` lies within `radius_deg` of (lat, lon).
pub fn has_job_near(request: &OptimizationRequest, (lat, lon): (f64, f64), radius_deg: f64) -> bool {
    request
        .jobs
        .iter()
        .any(|job| (job.location[1] - lat).abs() < radius_deg && (job.location[0] - lon).abs() < radius_deg)
}
