//! Error types for bundle construction, encoding and decoding.

use thiserror::Error;

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Stable error code, independent of the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    InvalidBundleHeader,
    LimitExceeded,
    EncodeFailed,
}

impl ErrorCode {
    /// Wire/CLI representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidBundleHeader => "INVALID_BUNDLE_HEADER",
            Self::LimitExceeded => "LIMIT_EXCEEDED",
            Self::EncodeFailed => "ENCODE_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the bundle API.
///
/// Every error is raised before the receiver is mutated: a failed setter or
/// `write` leaves the bundle exactly as it was, and a failed decode produces
/// no bundle at all.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A value of the wrong shape was passed to a setter, `write` or `mount`.
    #[error("INVALID_ARGUMENT: {message}")]
    InvalidArgument { message: String },

    /// The input is not a length-prefixed bundle header followed by a payload.
    #[error("INVALID_BUNDLE_HEADER: {message}")]
    InvalidBundleHeader {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A configured decode limit was exceeded.
    #[error("LIMIT_EXCEEDED: {what} exceeds limit of {limit}")]
    LimitExceeded { what: &'static str, limit: u64 },

    /// The header could not be serialized.
    #[error("ENCODE_FAILED: {0}")]
    Encode(#[source] serde_json::Error),
}

impl BundleError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid header error without an underlying cause
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidBundleHeader {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid header error wrapping a JSON parse failure
    pub fn invalid_header_json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidBundleHeader {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::InvalidBundleHeader { .. } => ErrorCode::InvalidBundleHeader,
            Self::LimitExceeded { .. } => ErrorCode::LimitExceeded,
            Self::Encode(_) => ErrorCode::EncodeFailed,
        }
    }

    /// Returns true if the decode input should be treated as corrupt or foreign.
    pub fn is_invalid_header(&self) -> bool {
        matches!(self, Self::InvalidBundleHeader { .. })
    }
}

/// Short description of a JSON value's type, used in argument errors.
pub(crate) fn describe(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean ({b})"),
        Value::Number(n) => format!("number ({n})"),
        Value::String(s) => format!("string ({s})"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
