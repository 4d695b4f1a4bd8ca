use serde_json::{Map, Value};

use huebeat_api::ResourceType;

/// Consumer of successfully decoded bridge payloads.
///
/// Called on the poller's task for every non-error response, in
/// registration order. Implementations should return quickly; hand heavy
/// work off to a channel.
pub trait Processor: Send + Sync {
    fn process_payload(&self, payload: &Map<String, Value>, resource: ResourceType);
}

impl<F> Processor for F
where
    F: Fn(&Map<String, Value>, ResourceType) + Send + Sync,
{
    fn process_payload(&self, payload: &Map<String, Value>, resource: ResourceType) {
        self(payload, resource);
    }
}
