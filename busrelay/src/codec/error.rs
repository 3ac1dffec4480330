//! Decode error types.

use serde::Serialize;
use thiserror::Error;

/// Location used for errors that concern the whole message.
pub(crate) const ROOT_LOCATION: &str = "__root__";

/// Category of a single field violation.
///
/// Serialized as the `type` of an error entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldErrorKind {
    /// Required field is absent.
    #[serde(rename = "value_error.missing")]
    Missing,
    /// Field should be a string.
    #[serde(rename = "type_error.str")]
    NotAString,
    /// Field should be a number.
    #[serde(rename = "type_error.float")]
    NotANumber,
    /// Field (or the message itself) should be an object.
    #[serde(rename = "type_error.dict")]
    NotAnObject,
    /// Value has the right type but is not acceptable (range, literal tag).
    #[serde(rename = "value_error")]
    InvalidValue,
    /// Message is not well-formed JSON.
    #[serde(rename = "value_error.jsondecode")]
    MalformedJson,
}

/// One violated field, as reported to the peer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Path to the field, e.g. `["data", "south_lat"]`.
    pub loc: Vec<String>,
    /// Human readable reason.
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind,
        }
    }

    /// Whether this error is about the named field (at any depth).
    pub fn concerns(&self, field: &str) -> bool {
        self.loc.iter().any(|l| l == field)
    }
}

/// Errors produced while decoding an inbound message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Input is not well-formed JSON.
    #[error("can not decode message \"{raw}\" to JSON")]
    MalformedSyntax { raw: String },

    /// One or more fields are missing, mistyped or out of range.
    ///
    /// Never empty.
    #[error("{} invalid field(s)", .0.len())]
    InvalidFields(Vec<FieldError>),
}

impl DecodeError {
    /// Error entries to report back, one per violated field.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            DecodeError::MalformedSyntax { .. } => vec![FieldError::new(
                &[ROOT_LOCATION],
                self.to_string(),
                FieldErrorKind::MalformedJson,
            )],
            DecodeError::InvalidFields(errors) => errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_serializes_type_tag() {
        let error = FieldError::new(&["data", "east_lng"], "field required", FieldErrorKind::Missing);
        let value = serde_json::to_value(&error).unwrap();

        assert_eq!(value["loc"], serde_json::json!(["data", "east_lng"]));
        assert_eq!(value["msg"], "field required");
        assert_eq!(value["type"], "value_error.missing");
    }

    #[test]
    fn test_malformed_syntax_is_one_root_entry() {
        let error = DecodeError::MalformedSyntax {
            raw: "invalid json".to_string(),
        };
        let entries = error.field_errors();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].concerns(ROOT_LOCATION));
        assert_eq!(entries[0].msg, "can not decode message \"invalid json\" to JSON");
    }
}
