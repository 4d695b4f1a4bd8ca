// Bridge HTTP client
//
// Wraps `reqwest::Client` with bridge URL construction and single-pass
// body decoding. Credentials travel in the request path, so URLs built
// here are never logged.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::resource::ResourceType;
use crate::response::Decoded;
use crate::transport::TransportConfig;

/// Raw HTTP client for one bridge.
///
/// Issues `GET http://{host}/api/{username}/{resource}` and hands back the
/// decoded body. Classification of the body (data vs. error list) is left
/// to the caller.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    /// Host, optionally with port (e.g. `192.168.1.20` or `bridge.lan:8080`).
    host: String,
    username: SecretString,
    timeout_secs: u64,
}

impl BridgeClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        host: impl Into<String>,
        username: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            host: host.into(),
            username,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, host: impl Into<String>, username: SecretString) -> Self {
        Self {
            http,
            host: host.into(),
            username,
            timeout_secs: 0,
        }
    }

    /// The bridge host this client talks to.
    pub fn host(&self) -> &str {
        &self.host
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `http://{host}/api/{username}/{resource}`.
    pub fn resource_url(&self, resource: ResourceType) -> Result<Url, Error> {
        let host = self.host.trim_end_matches('/');
        let full = format!(
            "http://{host}/api/{}/{}",
            self.username.expose_secret(),
            resource.path_segment()
        );
        Ok(Url::parse(&full)?)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// GET one resource and decode the body.
    ///
    /// Only transport failures are errors. The HTTP status is logged but
    /// not interpreted: the bridge reports API errors in the body.
    pub async fn fetch(&self, resource: ResourceType) -> Result<Decoded, Error> {
        let url = self.resource_url(resource)?;
        debug!(host = %self.host, %resource, "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%resource, %status, "bridge answered with non-success status");
        }

        let body = resp.bytes().await.map_err(|e| self.map_transport(e))?;
        trace!(%resource, len = body.len(), "response body received");

        Ok(Decoded::from_slice(&body))
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() && self.timeout_secs > 0 {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err.without_url())
        }
    }
}
