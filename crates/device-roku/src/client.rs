use crate::transport::HttpTransport;
use crate::xml::{XmlDocument, XmlElement};
use rokuecp_core::{CapabilityError, Method, Result, RokuDevice, RokuError, Transport};
use std::time::Duration;

/// Roku ECP client
///
/// Holds only the HTTP collaborator; every call takes the [`RokuDevice`] it
/// targets, so one client can drive any number of devices and nothing is
/// cached between calls.
pub struct EcpClient<T = HttpTransport> {
    transport: T,
}

impl EcpClient<HttpTransport> {
    /// Create a client using reqwest with the default timeout
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?))
    }

    /// Create a client using reqwest with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::with_timeout(timeout)?))
    }
}

impl<T: Transport> EcpClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET an ECP query endpoint and return the root element of the response
    pub(crate) fn get_document(&self, url: &str) -> Result<XmlElement> {
        let response = self.transport.send(Method::Get, url)?;
        if !response.is_success() {
            tracing::warn!("GET {} returned status {}", url, response.status);
            return Err(RokuError::from_status(response.status));
        }

        let document = XmlDocument::parse(&response.body).map_err(|e| {
            tracing::warn!("Failed to parse response from {}: {}", url, e);
            RokuError::Parse(e.to_string())
        })?;

        // A body without any element is not a well-formed document
        document.root.ok_or_else(|| {
            tracing::warn!("Response from {} has no root element", url);
            RokuError::Parse("no root element".to_string())
        })
    }

    /// POST an ECP command; the body of the response is ignored
    pub(crate) fn post(&self, url: &str) -> Result<()> {
        let response = self.transport.send(Method::Post, url)?;
        if !response.is_success() {
            tracing::debug!("POST {} returned status {}", url, response.status);
            return Err(RokuError::from_status(response.status));
        }
        Ok(())
    }
}

/// Reject devices in limited remote control mode
pub(crate) fn require_full_control(device: &RokuDevice) -> Result<()> {
    if device.is_limited {
        return Err(CapabilityError::LimitedMode.into());
    }
    Ok(())
}

/// Reject devices that are not Roku TVs
pub(crate) fn require_tv(device: &RokuDevice) -> Result<()> {
    if !device.is_tv {
        return Err(CapabilityError::NotATv.into());
    }
    Ok(())
}
