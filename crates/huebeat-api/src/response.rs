// ── Response decoding ──
//
// The bridge answers every GET with HTTP 200. A JSON object carries data;
// a JSON array carries one or more `{"error": {...}}` records. Each body is
// decoded exactly once into `Decoded` and then matched by the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// The shape of one decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A top-level JSON object.
    Object(Map<String, Value>),
    /// A top-level JSON array (the bridge's error list shape).
    Array(Vec<Value>),
    /// Not JSON, or a JSON scalar. Carries no typed meaning.
    Malformed,
}

impl Decoded {
    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from(value),
            Err(e) => {
                trace!(error = %e, len = body.len(), "response body is not JSON");
                Self::Malformed
            }
        }
    }
}

impl From<Value> for Decoded {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            _ => Self::Malformed,
        }
    }
}

// ── Bridge errors ────────────────────────────────────────────────

/// Wire wrapper: each error array element is `{"error": {...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: BridgeError,
}

/// An API-level error reported by the bridge inside an HTTP 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeError {
    /// Numeric error type as sent by the bridge.
    #[serde(rename = "type")]
    pub code: u16,
    /// Resource path the error refers to (e.g. `/lights/3`).
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

impl BridgeError {
    /// Decode a single error array element. Returns `None` for anything
    /// that does not match the `{"error": {"type": N, ...}}` shape.
    pub fn from_element(element: &Value) -> Option<Self> {
        ErrorEnvelope::deserialize(element).ok().map(|env| env.error)
    }

    pub fn kind(&self) -> BridgeErrorKind {
        BridgeErrorKind::from(self.code)
    }

    /// The username in the request path is not whitelisted on the bridge.
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == BridgeErrorKind::UnauthorizedUser
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bridge error {} ({})", self.code, self.kind())?;
        if !self.address.is_empty() {
            write!(f, " at {}", self.address)?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// Decode every well-formed error record in an error array.
/// Malformed elements are skipped.
pub fn decode_errors(elements: &[Value]) -> Vec<BridgeError> {
    elements.iter().filter_map(BridgeError::from_element).collect()
}

/// Known bridge error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeErrorKind {
    UnauthorizedUser,
    InvalidJson,
    ResourceNotAvailable,
    MethodNotAvailable,
    MissingParameters,
    ParameterNotAvailable,
    InvalidParameterValue,
    ParameterNotModifiable,
    TooManyItems,
    PortalConnectionRequired,
    LinkButtonNotPressed,
    DhcpCannotBeDisabled,
    InvalidUpdateState,
    DeviceOff,
    GroupTableFull,
    DeviceGroupTableFull,
    SceneCouldNotBeCreated,
    InternalError,
    Other(u16),
}

impl From<u16> for BridgeErrorKind {
    fn from(code: u16) -> Self {
        match code {
            1 => Self::UnauthorizedUser,
            2 => Self::InvalidJson,
            3 => Self::ResourceNotAvailable,
            4 => Self::MethodNotAvailable,
            5 => Self::MissingParameters,
            6 => Self::ParameterNotAvailable,
            7 => Self::InvalidParameterValue,
            8 => Self::ParameterNotModifiable,
            11 => Self::TooManyItems,
            12 => Self::PortalConnectionRequired,
            101 => Self::LinkButtonNotPressed,
            110 => Self::DhcpCannotBeDisabled,
            111 => Self::InvalidUpdateState,
            201 => Self::DeviceOff,
            301 => Self::GroupTableFull,
            302 => Self::DeviceGroupTableFull,
            402 => Self::SceneCouldNotBeCreated,
            901 => Self::InternalError,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for BridgeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnauthorizedUser => "unauthorized user",
            Self::InvalidJson => "body contains invalid JSON",
            Self::ResourceNotAvailable => "resource not available",
            Self::MethodNotAvailable => "method not available for resource",
            Self::MissingParameters => "missing parameters in body",
            Self::ParameterNotAvailable => "parameter not available",
            Self::InvalidParameterValue => "invalid value for parameter",
            Self::ParameterNotModifiable => "parameter is not modifiable",
            Self::TooManyItems => "too many items in list",
            Self::PortalConnectionRequired => "portal connection required",
            Self::LinkButtonNotPressed => "link button not pressed",
            Self::DhcpCannotBeDisabled => "DHCP cannot be disabled",
            Self::InvalidUpdateState => "invalid updatestate",
            Self::DeviceOff => "device is set to off",
            Self::GroupTableFull => "group could not be created, group table full",
            Self::DeviceGroupTableFull => "device group table full",
            Self::SceneCouldNotBeCreated => "scene could not be created",
            Self::InternalError => "internal error",
            Self::Other(code) => return write!(f, "error type {code}"),
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_object_array_and_malformed() {
        assert!(matches!(Decoded::from_slice(br#"{"1":{}}"#), Decoded::Object(m) if m.len() == 1));
        assert!(matches!(Decoded::from_slice(b"[]"), Decoded::Array(v) if v.is_empty()));
        assert_eq!(Decoded::from_slice(b"<html>"), Decoded::Malformed);
        assert_eq!(Decoded::from_slice(b"42"), Decoded::Malformed);
        assert_eq!(Decoded::from_slice(b""), Decoded::Malformed);
    }

    #[test]
    fn decodes_unauthorized_error_element() {
        let element = json!({
            "error": { "type": 1, "address": "/", "description": "unauthorized user" }
        });
        let err = BridgeError::from_element(&element);
        assert_eq!(
            err,
            Some(BridgeError {
                code: 1,
                address: "/".into(),
                description: "unauthorized user".into(),
            })
        );
        assert!(err.is_some_and(|e| e.is_unauthorized()));
    }

    #[test]
    fn skips_malformed_error_elements() {
        let elements = vec![
            json!({ "success": { "/lights/1/state/on": true } }),
            json!({ "error": { "description": "missing type" } }),
            json!("not an object"),
            json!({ "error": { "type": 3, "address": "/lights/9" } }),
        ];
        let errors = decode_errors(&elements);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), BridgeErrorKind::ResourceNotAvailable);
        assert!(!errors[0].is_unauthorized());
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(BridgeErrorKind::from(999), BridgeErrorKind::Other(999));
        assert_eq!(BridgeErrorKind::Other(999).to_string(), "error type 999");
    }

    #[test]
    fn display_includes_address_and_description() {
        let err = BridgeError {
            code: 101,
            address: String::new(),
            description: "link button not pressed".into(),
        };
        assert_eq!(
            err.to_string(),
            "bridge error 101 (link button not pressed): link button not pressed"
        );
    }
}
