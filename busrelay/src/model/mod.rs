//! Core data types shared by the relay and the emulator.
//!
//! - [`VehiclePosition`] - Latest known position of one vehicle
//! - [`WindowBounds`] - Rectangular lat/lng window a viewer is looking at
//! - [`Route`] - Named, ordered list of points a simulated vehicle cycles through

mod bounds;
mod position;
mod route;

pub use bounds::WindowBounds;
pub use position::VehiclePosition;
pub use route::{InvalidRoute, Route, RouteFile, RoutePoint};

/// Valid latitude range in degrees (inclusive).
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees (inclusive).
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;
