//! Montreal locations for realistic test fixtures.
//!
//! Coordinates are approximate neighbourhood centres, close enough to the
//! real map for city-scale clustering.

use visit_route_planner::profile::{Profile, ProfileId};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// Operator start point used across the tests.
pub const START: Location = Location::new("Loyola Campus", 45.47, -73.62);

pub const NDG: Location = Location::new("Notre-Dame-de-Grace", 45.458, -73.640);
pub const PLATEAU: Location = Location::new("Plateau Mont-Royal", 45.522, -73.582);
pub const LAVAL: Location = Location::new("Laval", 45.606, -73.712);

pub const NEIGHBOURHOODS: &[Location] = &[
    Location::new("Cote-des-Neiges", 45.4950, -73.6280),
    Location::new("Westmount", 45.4840, -73.5990),
    Location::new("Verdun", 45.4580, -73.5700),
    Location::new("Saint-Henri", 45.4770, -73.5860),
    Location::new("Outremont", 45.5170, -73.6080),
    Location::new("Mile End", 45.5250, -73.6000),
    Location::new("Rosemont", 45.5430, -73.5770),
    Location::new("Villeray", 45.5430, -73.6250),
    Location::new("Lachine", 45.4400, -73.6900),
    Location::new("LaSalle", 45.4300, -73.6300),
];

/// `n` points packed around `center` on a 5-wide grid of 0.0004 degree steps.
pub fn blob(center: &Location, n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let row = (i % 5) as f64 - 2.0;
            let col = (i / 5) as f64 - 2.0;
            (center.lat + row * 0.0004, center.lng + col * 0.0004)
        })
        .collect()
}

/// Profiles at `points`, with ids `first_id..`.
pub fn profiles_at(points: &[(f64, f64)], first_id: ProfileId) -> Vec<Profile> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng))| {
            let id = first_id + i as ProfileId;
            Profile::new(id).named(format!("Profile {id}")).at(lat, lng)
        })
        .collect()
}

/// `n` points spread over the named neighbourhoods.
pub fn spread(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let base = &NEIGHBOURHOODS[i % NEIGHBOURHOODS.len()];
            let step = (i / NEIGHBOURHOODS.len()) as f64 * 0.0007;
            (base.lat + step, base.lng - step)
        })
        .collect()
}
