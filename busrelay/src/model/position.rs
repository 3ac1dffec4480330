//! Vehicle position record.

use serde::{Deserialize, Serialize};

/// Latest known position of a single vehicle.
///
/// Instances are immutable once built: every update from a vehicle produces a
/// new value that replaces the previous one in the store. Field names on the
/// wire follow the JSON protocol (`busId`, `route`, `lat`, `lng`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    /// Unique vehicle identifier.
    #[serde(rename = "busId")]
    pub bus_id: String,

    /// Name of the route the vehicle is driving.
    pub route: String,

    /// Latitude in degrees (-90 to 90).
    pub lat: f64,

    /// Longitude in degrees (-180 to 180).
    pub lng: f64,
}

impl VehiclePosition {
    /// Create a new position record.
    ///
    /// No range checking happens here; untrusted input goes through
    /// [`crate::codec::decode_position`].
    pub fn new(bus_id: impl Into<String>, route: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            bus_id: bus_id.into(),
            route: route.into(),
            lat,
            lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_wire_field_names() {
        let position = VehiclePosition::new("7-A-0", "A", 55.75, 37.61);
        let value = serde_json::to_value(&position).unwrap();

        assert_eq!(value["busId"], "7-A-0");
        assert_eq!(value["route"], "A");
        assert_eq!(value["lat"], 55.75);
        assert_eq!(value["lng"], 37.61);
        assert!(value.get("bus_id").is_none());
    }
}
