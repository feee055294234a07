//! Error types for the route planner.
//!
//! `PlannerError` aborts a request. `UpstreamError` describes a failed call to
//! the optimizer or directions service and is recovered per cluster.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PlannerError {
    #[error("unknown filter field: {0}")]
    UnknownFilter(String),
    #[error("invalid value for filter {field}: {reason}")]
    InvalidFilterValue { field: String, reason: String },
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("ORS_API_KEY environment variable is missing")]
    MissingApiKey,
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, ThisError)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response has no routes")]
    MissingRoutes,
    #[error("route has no job steps")]
    NoJobSteps,
    #[error("response has no line geometry")]
    MissingGeometry,
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub fn invalid_filter_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
