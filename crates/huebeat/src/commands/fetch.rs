//! `huebeat fetch <resource>`: one request, printed as JSON.

use std::sync::Arc;

use serde_json::Value;

use huebeat_core::{
    BridgeError, BroadcastBus, Classified, HeartbeatPoller, ResourceType, classify,
};

use crate::cli::{FetchArgs, GlobalOpts};
use crate::commands::load_settings;
use crate::error::CliError;

pub async fn handle(args: &FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_settings(global)?;
    let access = huebeat_config::bridge_access(&cfg)?;
    let heartbeat = huebeat_config::heartbeat_config(&cfg)?;

    let poller = HeartbeatPoller::new(
        &access,
        &heartbeat,
        Vec::new(),
        Arc::new(BroadcastBus::default()),
    )?;

    let decoded = poller.fetch(args.resource).await?;
    match classify(args.resource, decoded) {
        Classified::Payload(payload) => {
            let value = Value::Object(payload);
            let rendered = if args.compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            println!("{rendered}");
            Ok(())
        }
        Classified::ApiError(errors) => Err(api_error(poller.host(), args.resource, &errors)),
        Classified::Malformed => Err(CliError::MalformedResponse {
            resource: args.resource.to_string(),
        }),
    }
}

/// Turn bridge error records into the most specific CLI error.
///
/// A short `config` object carries no records; it still means the bridge
/// did not accept the username.
fn api_error(host: &str, resource: ResourceType, errors: &[BridgeError]) -> CliError {
    if errors.is_empty() || errors.iter().any(BridgeError::is_unauthorized) {
        return CliError::NotAuthenticated { host: host.into() };
    }
    let summary = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    CliError::BridgeError {
        resource: resource.to_string(),
        count: errors.len(),
        summary,
    }
}
