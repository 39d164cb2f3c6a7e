//! Shared error type across pagewire crates.

use thiserror::Error;

/// Stable failure codes, used in logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required field was empty; resolved locally by moving focus.
    Validation,
    /// The reply could not be normalized into an envelope.
    Protocol,
    /// The envelope parsed but carried a nonzero `errcode`.
    Application,
    /// The network call did not complete.
    Transport,
    /// Configuration rejected at load time.
    BadConfig,
    /// Event referred to an element the page does not have.
    UnknownElement,
    /// Internal wiring error.
    Internal,
}

impl FailureKind {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "VALIDATION",
            FailureKind::Protocol => "PROTOCOL",
            FailureKind::Application => "APPLICATION",
            FailureKind::Transport => "TRANSPORT",
            FailureKind::BadConfig => "BAD_CONFIG",
            FailureKind::UnknownElement => "UNKNOWN_ELEMENT",
            FailureKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PageWireError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum PageWireError {
    #[error("required field is empty: {field}")]
    Validation { field: String },
    #[error("malformed reply: {0}")]
    Protocol(String),
    #[error("server rejected request (errcode {errcode}): {message}")]
    Application { errcode: i64, message: String },
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unknown element: {0}")]
    UnknownElement(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PageWireError {
    /// Map the error to its stable failure code.
    pub fn kind(&self) -> FailureKind {
        match self {
            PageWireError::Validation { .. } => FailureKind::Validation,
            PageWireError::Protocol(_) => FailureKind::Protocol,
            PageWireError::Application { .. } => FailureKind::Application,
            PageWireError::Transport(_) => FailureKind::Transport,
            PageWireError::BadConfig(_) => FailureKind::BadConfig,
            PageWireError::UnknownElement(_) => FailureKind::UnknownElement,
            PageWireError::Internal(_) => FailureKind::Internal,
        }
    }
}
