//! Error types for Server Technology PDU operations.
//!
//! HTTP failures are mapped once at the REST client boundary into an [`ErrorKind`]
//! and then into an [`Error`] variant; flows propagate those errors unchanged.

use thiserror::Error;

/// Main error type for PDU operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Resource does not exist or is temporarily unavailable (retryable)
    #[error("Resource unavailable: {0}")]
    Unavailable(String),

    /// Malformed request document or unsupported operation
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// HTTP method not permitted for the resource
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Requested change conflicts with the resource
    #[error("Conflict: {0}")]
    Conflict(String),

    /// PDU is too busy to serve the request
    #[error("Service busy: {0}")]
    ServiceBusy(String),

    /// Any other HTTP error status
    #[error("REST API error {status}: {message}")]
    Rest {
        /// HTTP status code returned by the PDU
        status: u16,
        /// Response body or description
        message: String,
    },

    /// Requested operation is not supported by the PDU
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Transport level failure (connection refused, TLS, ...)
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// Failed to parse a PDU response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for PDU operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failed HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transient unavailability (404), retried
    Unavailable,
    /// 400 Bad Request
    MalformedRequest,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 409 Conflict
    Conflict,
    /// 503 Service Unavailable
    ServiceBusy,
    /// Any status without a dedicated mapping
    Rest,
}

impl ErrorKind {
    /// Build the matching [`Error`] for a response with the given status and body.
    #[must_use]
    pub fn into_error(self, status: u16, message: impl Into<String>) -> Error {
        let message = message.into();
        match self {
            Self::Unavailable => Error::Unavailable(message),
            Self::MalformedRequest => Error::MalformedRequest(message),
            Self::MethodNotAllowed => Error::MethodNotAllowed(message),
            Self::Conflict => Error::Conflict(message),
            Self::ServiceBusy => Error::ServiceBusy(message),
            Self::Rest => Error::Rest { status, message },
        }
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::Conflict(_) => "CONFLICT",
            Self::ServiceBusy(_) => "SERVICE_BUSY",
            Self::Rest { .. } => "REST_API_ERROR",
            Self::NotSupported(_) => "NOT_SUPPORTED",
            Self::Timeout(_) => "TIMEOUT",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns the [`ErrorKind`] of a mapped HTTP failure, if this is one.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Unavailable(_) => Some(ErrorKind::Unavailable),
            Self::MalformedRequest(_) => Some(ErrorKind::MalformedRequest),
            Self::MethodNotAllowed(_) => Some(ErrorKind::MethodNotAllowed),
            Self::Conflict(_) => Some(ErrorKind::Conflict),
            Self::ServiceBusy(_) => Some(ErrorKind::ServiceBusy),
            Self::Rest { .. } => Some(ErrorKind::Rest),
            _ => None,
        }
    }

    /// Returns true for errors produced by mapping an HTTP error status.
    #[must_use]
    pub const fn is_rest_api_error(&self) -> bool {
        self.kind().is_some()
    }

    /// Returns true if the request may succeed when repeated.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Unavailable("test".to_string()).error_code(),
            "UNAVAILABLE"
        );
        assert_eq!(
            Error::MalformedRequest("test".to_string()).error_code(),
            "MALFORMED_REQUEST"
        );
        assert_eq!(Error::Conflict("test".to_string()).error_code(), "CONFLICT");
        assert_eq!(
            Error::Rest {
                status: 500,
                message: "boom".to_string()
            }
            .error_code(),
            "REST_API_ERROR"
        );
        assert_eq!(
            Error::NotSupported("test".to_string()).error_code(),
            "NOT_SUPPORTED"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotSupported("State 'blink' is not supported.".to_string());
        assert_eq!(
            err.to_string(),
            "Not supported: State 'blink' is not supported."
        );

        let err = Error::Rest {
            status: 500,
            message: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "REST API error 500: internal");
    }

    #[test]
    fn test_kind_round_trips_through_into_error() {
        for kind in [
            ErrorKind::Unavailable,
            ErrorKind::MalformedRequest,
            ErrorKind::MethodNotAllowed,
            ErrorKind::Conflict,
            ErrorKind::ServiceBusy,
            ErrorKind::Rest,
        ] {
            assert_eq!(kind.into_error(418, "body").kind(), Some(kind));
        }
    }

    #[test]
    fn test_rest_kind_keeps_status() {
        let err = ErrorKind::Rest.into_error(502, "bad gateway");
        assert_eq!(
            err,
            Error::Rest {
                status: 502,
                message: "bad gateway".to_string()
            }
        );
    }

    #[test]
    fn test_rest_api_classification() {
        assert!(Error::Conflict("x".to_string()).is_rest_api_error());
        assert!(Error::Unavailable("x".to_string()).is_rest_api_error());
        assert!(!Error::NotSupported("x".to_string()).is_rest_api_error());
        assert!(!Error::Timeout("x".to_string()).is_rest_api_error());
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(Error::Unavailable("x".to_string()).is_transient());
        assert!(!Error::ServiceBusy("x".to_string()).is_transient());
        assert!(!Error::Conflict("x".to_string()).is_transient());
        assert!(!Error::Timeout("x".to_string()).is_transient());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let pdu_err: Error = err.into();
        assert!(matches!(pdu_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let pdu_err: Error = err.into();
        assert!(matches!(pdu_err, Error::ParseError(_)));
    }
}
