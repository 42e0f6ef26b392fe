use crate::error::TransportError;
use std::fmt;

/// HTTP methods used by ECP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP collaborator used by every ECP call (reqwest in production, a
/// recording fake in tests)
///
/// An `Err` means no status was received at all (DNS, connect, timeout).
/// Every status, including errors, comes back as `Ok`.
pub trait Transport: Send + Sync {
    fn send(&self, method: Method, url: &str) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, method: Method, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).send(method, url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, method: Method, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).send(method, url)
    }
}
