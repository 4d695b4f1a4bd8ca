// Shared transport configuration for building reqwest::Client instances.

use std::time::Duration;

/// Transport settings for the bridge HTTP client.
///
/// The bridge speaks plain HTTP on the local network and requests carry
/// no custom headers, so the only knob is the request timeout.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }
}
