//! Position Codec - validation and (de)serialization of wire messages.
//!
//! Inbound records are untrusted. They are parsed into a JSON value first and
//! then checked field by field, so one bad message reports **every** violated
//! field at once instead of stopping at the first:
//!
//! ```text
//! raw bytes ──► serde_json::Value ──► FieldReader ──► VehiclePosition
//!                    │                    │
//!                    ▼                    ▼
//!            MalformedSyntax      InvalidFields(Vec<FieldError>)
//! ```
//!
//! Outbound messages (`Buses`, `Errors`) are plain `Serialize` structs.
//!
//! # Wire formats
//!
//! | Direction        | Shape                                                            |
//! |------------------|------------------------------------------------------------------|
//! | vehicle → relay  | `{busId, route, lat, lng}`                                       |
//! | viewer → relay   | `{msgType: "newBounds", data: {south_lat, north_lat, west_lng, east_lng}}` |
//! | relay → viewer   | `{msgType: "Buses", buses: [...]}`                               |
//! | relay → any peer | `{msgType: "Errors", errors: [{loc, msg, type}, ...]}`           |

mod decode;
mod encode;
mod error;

pub use decode::{decode_bounds_message, decode_position, BOUNDS_MESSAGE_TYPE};
pub use encode::{encode_buses, encode_errors, encode_position, BUSES_MESSAGE_TYPE, ERRORS_MESSAGE_TYPE};
pub use error::{DecodeError, FieldError, FieldErrorKind};
