//! Distances and coordinate checks for (lat, lon) points.
//!
//! Cluster sequencing uses the ellipsoidal geodesic distance; the
//! partitioner works on the raw lon/lat plane.

use geo::line_measures::Distance;
use geo::{Geodesic, Point};

/// Geodesic (WGS84 ellipsoid) distance between two (lat, lon) points in meters.
pub fn geodesic_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;
    Geodesic.distance(Point::new(lon1, lat1), Point::new(lon2, lat2))
}

/// True when the pair is finite and inside the valid lat/lon ranges.
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Arithmetic mean of the given points. `None` when empty.
pub fn mean_point<I>(points: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut count = 0usize;
    let (mut lat_sum, mut lon_sum) = (0.0, 0.0);
    for (lat, lon) in points {
        lat_sum += lat;
        lon_sum += lon;
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some((lat_sum / count as f64, lon_sum / count as f64))
}

/// Converts an internal (lat, lon) pair into the `[lon, lat]` order used on the wire.
pub fn to_lon_lat((lat, lon): (f64, f64)) -> [f64; 2] {
    [lon, lat]
}

/// Converts a wire `[lon, lat]` pair back into (lat, lon).
pub fn from_lon_lat([lon, lat]: [f64; 2]) -> (f64, f64) {
    (lat, lon)
}
