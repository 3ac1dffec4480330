//! Decoding of inbound vehicle and viewer messages.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use super::error::{DecodeError, FieldError, FieldErrorKind, ROOT_LOCATION};
use crate::model::{VehiclePosition, WindowBounds, LATITUDE_RANGE, LONGITUDE_RANGE};

/// Literal `msgType` of a bounds-update message.
pub const BOUNDS_MESSAGE_TYPE: &str = "newBounds";

const LATITUDE_MSG: &str = "should be between -90 and 90";
const LONGITUDE_MSG: &str = "should be between -180 and 180";

/// Decode a vehicle position record `{busId, route, lat, lng}`.
///
/// Every violated field is reported; a record with a missing `route` and an
/// out-of-range `lat` yields two errors.
pub fn decode_position(raw: &[u8]) -> Result<VehiclePosition, DecodeError> {
    let value = parse(raw)?;
    let mut errors = Vec::new();

    let object = match root_object(&value, &mut errors) {
        Some(object) => object,
        None => return Err(DecodeError::InvalidFields(errors)),
    };

    let mut fields = FieldReader::new(object, &[], &mut errors);
    let bus_id = fields.string("busId");
    let route = fields.string("route");
    let lat = fields.number_in("lat", &LATITUDE_RANGE, LATITUDE_MSG);
    let lng = fields.number_in("lng", &LONGITUDE_RANGE, LONGITUDE_MSG);

    match (bus_id, route, lat, lng) {
        (Some(bus_id), Some(route), Some(lat), Some(lng)) => Ok(VehiclePosition {
            bus_id,
            route,
            lat,
            lng,
        }),
        _ => Err(DecodeError::InvalidFields(errors)),
    }
}

/// Decode a bounds-update message `{msgType: "newBounds", data: {...}}`.
///
/// A wrong or missing `msgType` is reported alongside any errors in `data`.
pub fn decode_bounds_message(raw: &[u8]) -> Result<WindowBounds, DecodeError> {
    let value = parse(raw)?;
    let mut errors = Vec::new();

    let object = match root_object(&value, &mut errors) {
        Some(object) => object,
        None => return Err(DecodeError::InvalidFields(errors)),
    };

    let mut fields = FieldReader::new(object, &[], &mut errors);
    let tag_ok = fields.literal("msgType", BOUNDS_MESSAGE_TYPE);
    let data = fields.object("data");

    let bounds = data.and_then(|data| {
        let mut fields = FieldReader::new(data, &["data"], &mut errors);
        let south = fields.number_in("south_lat", &LATITUDE_RANGE, LATITUDE_MSG);
        let north = fields.number_in("north_lat", &LATITUDE_RANGE, LATITUDE_MSG);
        let west = fields.number_in("west_lng", &LONGITUDE_RANGE, LONGITUDE_MSG);
        let east = fields.number_in("east_lng", &LONGITUDE_RANGE, LONGITUDE_MSG);
        Some(WindowBounds::new(south?, north?, west?, east?))
    });

    match bounds {
        Some(bounds) if tag_ok => Ok(bounds),
        _ => Err(DecodeError::InvalidFields(errors)),
    }
}

fn parse(raw: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(raw).map_err(|_| DecodeError::MalformedSyntax {
        raw: String::from_utf8_lossy(raw).into_owned(),
    })
}

fn root_object<'a>(value: &'a Value, errors: &mut Vec<FieldError>) -> Option<&'a Map<String, Value>> {
    let object = value.as_object();
    if object.is_none() {
        errors.push(FieldError::new(
            &[ROOT_LOCATION],
            "value is not a valid dict",
            FieldErrorKind::NotAnObject,
        ));
    }
    object
}

/// Reads typed fields out of a JSON object, recording a [`FieldError`] for
/// each one that is missing, mistyped or out of range.
struct FieldReader<'a, 'e> {
    object: &'a Map<String, Value>,
    prefix: &'static [&'static str],
    errors: &'e mut Vec<FieldError>,
}

impl<'a, 'e> FieldReader<'a, 'e> {
    fn new(
        object: &'a Map<String, Value>,
        prefix: &'static [&'static str],
        errors: &'e mut Vec<FieldError>,
    ) -> Self {
        Self {
            object,
            prefix,
            errors,
        }
    }

    fn report(&mut self, field: &str, msg: &str, kind: FieldErrorKind) {
        let mut loc: Vec<&str> = self.prefix.to_vec();
        loc.push(field);
        self.errors.push(FieldError::new(&loc, msg, kind));
    }

    fn field(&mut self, field: &str) -> Option<&'a Value> {
        let value = self.object.get(field);
        if value.is_none() {
            self.report(field, "field required", FieldErrorKind::Missing);
        }
        value
    }

    fn string(&mut self, field: &str) -> Option<String> {
        match self.field(field)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.report(field, "str type expected", FieldErrorKind::NotAString);
                None
            }
        }
    }

    fn number_in(&mut self, field: &str, range: &RangeInclusive<f64>, msg: &str) -> Option<f64> {
        let number = match self.field(field)?.as_f64() {
            Some(n) => n,
            None => {
                self.report(field, "value is not a valid float", FieldErrorKind::NotANumber);
                return None;
            }
        };
        if !range.contains(&number) {
            self.report(field, msg, FieldErrorKind::InvalidValue);
            return None;
        }
        Some(number)
    }

    fn literal(&mut self, field: &str, expected: &str) -> bool {
        match self.string(field) {
            Some(s) if s == expected => true,
            Some(_) => {
                let msg = format!("{} should be equal {}", field, expected);
                self.report(field, &msg, FieldErrorKind::InvalidValue);
                false
            }
            None => false,
        }
    }

    fn object(&mut self, field: &str) -> Option<&'a Map<String, Value>> {
        match self.field(field)? {
            Value::Object(map) => Some(map),
            _ => {
                self.report(field, "value is not a valid dict", FieldErrorKind::NotAnObject);
                None
            }
        }
    }
}
