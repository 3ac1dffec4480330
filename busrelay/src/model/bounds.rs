//! Viewer window bounds.

use serde::{Deserialize, Serialize};

use super::VehiclePosition;

/// Rectangular geographic window requested by a viewer.
///
/// Each coordinate is range-checked on decode, but the relation between them is
/// not: `south_lat > north_lat` or `west_lng > east_lng` is accepted as-is and
/// filtering keeps its literal meaning (such a window matches nothing on that
/// axis). The type is `Copy`; a viewer session replaces the whole value rather
/// than mutating fields one by one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub south_lat: f64,
    pub north_lat: f64,
    pub west_lng: f64,
    pub east_lng: f64,
}

impl WindowBounds {
    /// Create bounds from the four edges.
    pub fn new(south_lat: f64, north_lat: f64, west_lng: f64, east_lng: f64) -> Self {
        Self {
            south_lat,
            north_lat,
            west_lng,
            east_lng,
        }
    }

    /// The whole globe. Every viewer session starts here.
    pub const fn world() -> Self {
        Self {
            south_lat: -90.0,
            north_lat: 90.0,
            west_lng: -180.0,
            east_lng: 180.0,
        }
    }

    /// Check whether a position lies inside the window.
    ///
    /// All four comparisons are inclusive, so a vehicle exactly on an edge is
    /// inside.
    pub fn contains(&self, position: &VehiclePosition) -> bool {
        self.south_lat <= position.lat
            && position.lat <= self.north_lat
            && self.west_lng <= position.lng
            && position.lng <= self.east_lng
    }
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self::world()
    }
}


/// Property-based tests for window filtering.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `contains` is exactly four inclusive, independent comparisons, for
        /// any window including inverted ones.
        #[test]
        fn contains_matches_edge_comparisons(
            south in -90.0f64..=90.0f64,
            north in -90.0f64..=90.0f64,
            west in -180.0f64..=180.0f64,
            east in -180.0f64..=180.0f64,
            lat in -90.0f64..=90.0f64,
            lng in -180.0f64..=180.0f64,
        ) {
            let bounds = WindowBounds::new(south, north, west, east);
            let position = VehiclePosition::new("1", "A", lat, lng);
            let expected = south <= lat && lat <= north && west <= lng && lng <= east;

            prop_assert_eq!(bounds.contains(&position), expected);
        }

        /// A position sitting on any corner of a non-inverted window is inside.
        #[test]
        fn corners_are_inside(
            a in -90.0f64..=90.0f64,
            b in -90.0f64..=90.0f64,
            c in -180.0f64..=180.0f64,
            d in -180.0f64..=180.0f64,
        ) {
            let bounds = WindowBounds::new(a.min(b), a.max(b), c.min(d), c.max(d));
            for (lat, lng) in [(a, c), (a, d), (b, c), (b, d)] {
                prop_assert!(bounds.contains(&VehiclePosition::new("1", "A", lat, lng)));
            }
        }
    }
}
