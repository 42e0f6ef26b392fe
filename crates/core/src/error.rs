//! Error taxonomy shared by every ECP operation.
//!
//! Each operation returns exactly one [`RokuError`] on failure. [`RokuError::code`]
//! maps it onto the signed result codes of the C API, so callers that only care
//! about "did it work" can keep comparing integers.

use thiserror::Error;

/// Result type alias for ECP operations
pub type Result<T, E = RokuError> = std::result::Result<T, E>;

/// Preconditions that are checked locally, before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("device is in limited remote control mode")]
    LimitedMode,

    #[error("operation requires a Roku TV")]
    NotATv,

    #[error("key {0} is only valid on a Roku TV")]
    InvalidKeyForDeviceClass(String),

    #[error("device does not support search")]
    SearchUnsupported,

    #[error("search keyword is empty")]
    EmptyKeyword,
}

/// Failure of the HTTP collaborator before any status was received
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Main error type for ECP operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RokuError {
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("device has remote control disabled")]
    Unauthorized,

    #[error("device returned HTTP status {status}")]
    Protocol { status: u16 },

    #[error("malformed XML response: {0}")]
    Parse(String),

    #[error("response document is empty")]
    EmptyDocument,

    #[error("not supported: {0}")]
    Capability(#[from] CapabilityError),

    #[error("SSDP discovery failed: {0}")]
    Discovery(#[source] std::io::Error),
}

impl RokuError {
    /// Signed result code for this error
    ///
    /// | code | error |
    /// |---|---|
    /// | -1 | transport |
    /// | -2 | parse |
    /// | -3 | empty document |
    /// | -4 | capability |
    /// | -5 | unauthorized |
    /// | -6 | protocol |
    /// | -7 | discovery setup |
    pub fn code(&self) -> i32 {
        match self {
            RokuError::Transport(_) => -1,
            RokuError::Parse(_) => -2,
            RokuError::EmptyDocument => -3,
            RokuError::Capability(_) => -4,
            RokuError::Unauthorized => -5,
            RokuError::Protocol { .. } => -6,
            RokuError::Discovery(_) => -7,
        }
    }

    /// Map a non-success HTTP status onto the taxonomy
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => RokuError::Unauthorized,
            status => RokuError::Protocol { status },
        }
    }

    pub fn is_capability(&self) -> bool {
        matches!(self, RokuError::Capability(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RokuError::Unauthorized)
    }
}

/// Collapse an operation result into a single signed code (0 on success)
pub fn result_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}
