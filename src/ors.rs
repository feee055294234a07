//! openrouteservice HTTP adapter for job optimization and directions.

use std::env;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, UpstreamError};
use crate::polyline::Polyline;
use crate::traits::{DirectionsProvider, JobOptimizer};

pub const DEFAULT_PROFILE: &str = "driving-car";

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl OrsConfig {
    /// Reads `ORS_API_KEY` (required), `ORS_BASE_URL`, `ORS_PROFILE` and
    /// `ORS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PlannerError> {
        let defaults = Self::default();
        let api_key = env::var("ORS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(PlannerError::MissingApiKey)?;

        let config = Self {
            base_url: env::var("ORS_BASE_URL").unwrap_or(defaults.base_url),
            api_key,
            profile: env::var("ORS_PROFILE").unwrap_or(defaults.profile),
            timeout_secs: parse_timeout(env::var("ORS_TIMEOUT_SECS").ok(), defaults.timeout_secs)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.timeout_secs == 0 {
            return Err(PlannerError::invalid_config("ORS timeout must be at least 1 second"));
        }
        Ok(())
    }
}

fn parse_timeout(raw: Option<String>, default: u64) -> Result<u64, PlannerError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PlannerError::invalid_config(format!("ORS_TIMEOUT_SECS is not a number of seconds: {raw:?}"))),
    }
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, PlannerError> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn post<B, R>(&self, path: &str, body: &B) -> Result<R, UpstreamError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, &self.config.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<R>()?)
    }
}

impl JobOptimizer for OrsClient {
    fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResponse, UpstreamError> {
        tracing::debug!(jobs = request.jobs.len(), "requesting optimization");
        self.post("/optimization", request)
    }
}

impl DirectionsProvider for OrsClient {
    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, UpstreamError> {
        tracing::debug!(coordinates = request.coordinates.len(), "requesting directions");
        let path = format!("/v2/directions/{}/geojson", self.config.profile);
        self.post(&path, request)
    }
}

/// A point to visit. `location` is `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub location: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    pub start: [f64; 2],
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub jobs: Vec<Job>,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    #[serde(default)]
    pub routes: Option<Vec<OptimizedRoute>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRoute {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Start,
    Job,
    End,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<u64>,
}

impl Step {
    pub fn job(id: u64) -> Self {
        Self {
            kind: StepKind::Job,
            job: Some(id),
        }
    }

    pub fn start() -> Self {
        Self {
            kind: StepKind::Start,
            job: None,
        }
    }

    pub fn end() -> Self {
        Self {
            kind: StepKind::End,
            job: None,
        }
    }
}

impl OptimizationResponse {
    /// A response with one route made of the given steps.
    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            routes: Some(vec![OptimizedRoute { steps }]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub coordinates: Vec<[f64; 2]>,
    pub instructions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Polyline,
}

impl DirectionsResponse {
    /// Geometry of the first feature.
    pub fn into_line(self) -> Result<Polyline, UpstreamError> {
        self.features
            .into_iter()
            .next()
            .map(|feature| feature.geometry)
            .ok_or(UpstreamError::MissingGeometry)
    }
}
