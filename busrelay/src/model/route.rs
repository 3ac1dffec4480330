//! Routes driven by simulated vehicles.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::{LATITUDE_RANGE, LONGITUDE_RANGE};

/// One `(lat, lng)` point of a route.
pub type RoutePoint = (f64, f64);

/// Why a set of points cannot form a [`Route`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidRoute {
    #[error("route has no coordinates")]
    Empty,

    #[error("point {index} ({lat}, {lng}) is outside lat -90..=90 / lng -180..=180")]
    OutOfRange { index: usize, lat: f64, lng: f64 },
}

/// Route as stored on disk, before validation.
///
/// `{"name": ..., "coordinates": [[lat, lng], ...]}`; other keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteFile {
    pub name: String,
    pub coordinates: Vec<RoutePoint>,
}

/// A named, ordered, non-empty sequence of coordinates.
///
/// Loaded once at startup and shared read-only by every simulator driving it,
/// hence the `Arc` around the points. Deserializing goes through
/// [`Route::new`], so every `Route` holds at least one in-range point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RouteFile")]
pub struct Route {
    pub name: String,
    points: Arc<[RoutePoint]>,
}

impl Route {
    /// Create a route, checking every point lies in the coordinate domain.
    pub fn new(name: impl Into<String>, points: Vec<RoutePoint>) -> Result<Self, InvalidRoute> {
        if points.is_empty() {
            return Err(InvalidRoute::Empty);
        }
        let out_of_range = points
            .iter()
            .position(|(lat, lng)| !LATITUDE_RANGE.contains(lat) || !LONGITUDE_RANGE.contains(lng));
        if let Some(index) = out_of_range {
            let (lat, lng) = points[index];
            return Err(InvalidRoute::OutOfRange { index, lat, lng });
        }
        Ok(Self {
            name: name.into(),
            points: points.into(),
        })
    }

    /// All points in driving order.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Number of points, at least one.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, wrapping around the end of the route.
    pub fn point(&self, index: usize) -> RoutePoint {
        self.points[index % self.points.len()]
    }
}

impl TryFrom<RouteFile> for Route {
    type Error = InvalidRoute;

    fn try_from(file: RouteFile) -> Result<Self, Self::Error> {
        Route::new(file.name, file.coordinates)
    }
}
