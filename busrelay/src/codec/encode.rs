//! Encoding of outbound messages.

use serde::Serialize;

use super::error::{DecodeError, FieldError};
use crate::model::VehiclePosition;

/// `msgType` of the periodic viewer broadcast.
pub const BUSES_MESSAGE_TYPE: &str = "Buses";

/// `msgType` of an error report.
pub const ERRORS_MESSAGE_TYPE: &str = "Errors";

#[derive(Serialize)]
struct BusesMessage<'a> {
    #[serde(rename = "msgType")]
    msg_type: &'static str,
    buses: &'a [VehiclePosition],
}

#[derive(Serialize)]
struct ErrorsMessage<'a> {
    #[serde(rename = "msgType")]
    msg_type: &'static str,
    errors: &'a [FieldError],
}

/// Encode a single position as sent by a vehicle.
pub fn encode_position(position: &VehiclePosition) -> Result<String, serde_json::Error> {
    serde_json::to_string(position)
}

/// Encode the broadcast sent to a viewer.
pub fn encode_buses(buses: &[VehiclePosition]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&BusesMessage {
        msg_type: BUSES_MESSAGE_TYPE,
        buses,
    })
}

/// Encode a decode failure as one `Errors` message carrying every entry.
pub fn encode_errors(error: &DecodeError) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ErrorsMessage {
        msg_type: ERRORS_MESSAGE_TYPE,
        errors: &error.field_errors(),
    })
}
