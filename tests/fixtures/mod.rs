//! Test fixtures for visit-route-planner.
//!
//! Provides:
//! - Montreal locations and deterministic point blobs
//! - Mock optimizer and directions services

#![allow(dead_code)]

pub mod montreal_locations;
pub mod mocks;

pub use montreal_locations::*;
pub use mocks::*;
