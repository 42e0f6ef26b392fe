use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use rokuecp_core::{HttpResponse, Method, Transport, TransportError};
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocking HTTP transport backed by reqwest
///
/// A fresh connection is used for every request; Roku devices close idle
/// ECP connections quickly and nothing is shared between calls.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::with_source("failed to build HTTP client", e))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: Method, url: &str) -> Result<HttpResponse, TransportError> {
        tracing::debug!("ECP {} {}", method, url);

        let request = match method {
            Method::Get => self.client.get(url),
            // ECP POSTs carry everything in the URL
            Method::Post => self.client.post(url).header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let response = request
            .send()
            .map_err(|e| TransportError::with_source(format!("{} {} failed", method, url), e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .map_err(|e| TransportError::with_source(format!("failed to read response from {}", url), e))?;

        tracing::debug!("ECP response: {} ({} bytes)", status, body.len());

        Ok(HttpResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
