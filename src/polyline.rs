//! Polyline representation for route geometries.
//!
//! Points are held as decoded (lat, lon) pairs. On the wire a polyline is a
//! GeoJSON `LineString` whose coordinates are `[lon, lat]`; the conversion
//! happens only in the serde impls.

use serde::{Deserialize, Serialize};

use crate::geodesic::{from_lon_lat, to_lon_lat};

const LINE_STRING: &str = "LineString";

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "LineString", try_from = "LineString")]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a new Polyline from (latitude, longitude) points.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinates in `[lon, lat]` order.
    pub fn lon_lat(&self) -> Vec<[f64; 2]> {
        self.points.iter().copied().map(to_lon_lat).collect()
    }
}

#[derive(Serialize, Deserialize)]
struct LineString {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<[f64; 2]>,
}

impl From<Polyline> for LineString {
    fn from(polyline: Polyline) -> Self {
        Self {
            kind: LINE_STRING.to_string(),
            coordinates: polyline.lon_lat(),
        }
    }
}

impl TryFrom<LineString> for Polyline {
    type Error = String;

    fn try_from(line: LineString) -> Result<Self, Self::Error> {
        if line.kind != LINE_STRING {
            return Err(format!("expected {LINE_STRING} geometry, got {}", line.kind));
        }
        Ok(Self::new(line.coordinates.into_iter().map(from_lon_lat).collect()))
    }
}
