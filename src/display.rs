//! Final display payload: road geometry plus one coloured marker per stop.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::geodesic::to_lon_lat;
use crate::ors::{DirectionsRequest, DirectionsResponse};
use crate::polyline::Polyline;
use crate::profile::{ProfileId, StopAttributes};
use crate::stitch::StitchedRoute;
use crate::traits::{DirectionsProvider, ProfileStore};

/// Green to dark blue, first stop to last.
pub const PALETTE: [&str; 5] = ["green", "lightgreen", "cadetblue", "blue", "darkblue"];

/// One colour per stop. Beyond the palette size, stops share colours
/// proportionally so the gradient stays monotonic.
pub fn gradient_colors(n: usize) -> Vec<&'static str> {
    if n <= PALETTE.len() {
        return PALETTE[..n].to_vec();
    }
    (0..n).map(|i| PALETTE[i * (PALETTE.len() - 1) / n]).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StartPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: ProfileId,
    pub lat: f64,
    pub lon: f64,
    pub color: String,
    #[serde(flatten)]
    pub attributes: StopAttributes,
}

/// What the map renders: start, ordered markers and the road path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPayload {
    pub start: StartPoint,
    pub markers: Vec<Marker>,
    pub route: Polyline,
}

/// Builds the payload for a stitched route.
///
/// Returns `Ok(None)` without calling any service when there is nothing to
/// draw. A failed directions call leaves the route geometry empty.
pub fn assemble<S, D>(stitched: &StitchedRoute, store: &S, directions: &D) -> Result<Option<DisplayPayload>>
where
    S: ProfileStore + ?Sized,
    D: DirectionsProvider + ?Sized,
{
    let Some(start) = stitched.start() else {
        return Ok(None);
    };
    if stitched.is_empty() {
        return Ok(None);
    }

    let route = road_geometry(stitched, directions);

    let ids: Vec<ProfileId> = stitched.ids().collect();
    let mut attributes: HashMap<ProfileId, StopAttributes> = store
        .profiles_by_ids(&ids)?
        .into_iter()
        .map(|profile| (profile.id, profile.stop_attributes()))
        .collect();

    let colors = gradient_colors(ids.len());
    let markers = stitched
        .stops()
        .iter()
        .zip(&ids)
        .zip(colors)
        .map(|((&(lat, lon), &id), color)| Marker {
            id,
            lat,
            lon,
            color: color.to_string(),
            attributes: attributes.remove(&id).unwrap_or_else(|| {
                tracing::debug!(id, "no record for routed stop");
                StopAttributes::unknown()
            }),
        })
        .collect();

    Ok(Some(DisplayPayload {
        start: StartPoint {
            lat: start.0,
            lon: start.1,
        },
        markers,
        route,
    }))
}

fn road_geometry<D>(stitched: &StitchedRoute, directions: &D) -> Polyline
where
    D: DirectionsProvider + ?Sized,
{
    let request = DirectionsRequest {
        coordinates: stitched.points.iter().copied().map(to_lon_lat).collect(),
        instructions: false,
    };

    match directions.directions(&request).and_then(DirectionsResponse::into_line) {
        Ok(line) => line,
        Err(err) => {
            tracing::warn!(error = %err, "directions request failed");
            Polyline::default()
        }
    }
}
