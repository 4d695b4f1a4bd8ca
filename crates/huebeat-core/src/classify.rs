// ── Response classification ──
//
// Decides, once per response, whether a decoded body is data or an
// API-level error. The rule depends on the resource type: the bridge
// always answers `config` with an object, but an unauthenticated client
// gets a truncated one.

use serde_json::{Map, Value};

use huebeat_api::{BridgeError, Decoded, ResourceType, decode_errors};

/// A `config` object with at most this many top-level fields is the
/// unauthenticated subset, not the full configuration.
pub const CONFIG_ERROR_FIELD_LIMIT: usize = 8;

/// Outcome of classifying one decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Data to hand to processors.
    Payload(Map<String, Value>),
    /// The bridge reported an error. Holds every well-formed error record;
    /// may be empty (short `config` object, or only malformed elements).
    ApiError(Vec<BridgeError>),
    /// Nothing usable.
    Malformed,
}

pub fn classify(resource: ResourceType, decoded: Decoded) -> Classified {
    match decoded {
        Decoded::Malformed => Classified::Malformed,
        Decoded::Array(items) => Classified::ApiError(decode_errors(&items)),
        Decoded::Object(map)
            if resource == ResourceType::Config && map.len() <= CONFIG_ERROR_FIELD_LIMIT =>
        {
            Classified::ApiError(Vec::new())
        }
        Decoded::Object(map) => Classified::Payload(map),
    }
}
