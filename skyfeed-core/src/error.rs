//! Error types for SKYFEED operations

use std::time::Duration;
use thiserror::Error;

/// Transport-level and HTTP status errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Request to {url} returned status {status} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },
}

/// Errors raised while turning a response body into a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Missing field {path} in {endpoint} response")]
    MissingField { endpoint: String, path: String },

    #[error("Response is not tabular: {reason}")]
    NotTabular { reason: String },

    #[error("Failed to parse CSV: {reason}")]
    Csv { reason: String },
}

/// Local validation errors for query arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported output format: {format} (only csv is supported)")]
    UnsupportedFormat { format: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Coarse failure classification carried alongside the detailed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection-level failure or timeout
    Network,
    /// Terminal non-2xx status
    Status,
    /// Body could not be decoded
    Parse,
    /// Body decoded but did not have the expected shape
    Shape,
    /// Arguments rejected before any request was made
    Validation,
    /// Invalid client configuration
    Config,
}

/// Master error type for all SKYFEED errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SkyfeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SkyfeedError {
    /// Classify this error for callers that only distinguish coarse kinds.
    pub fn kind(&self) -> FailureKind {
        match self {
            SkyfeedError::Http(HttpError::Transport { .. })
            | SkyfeedError::Http(HttpError::Timeout { .. }) => FailureKind::Network,
            SkyfeedError::Http(HttpError::Status { .. }) => FailureKind::Status,
            SkyfeedError::Response(ResponseError::Decode { .. })
            | SkyfeedError::Response(ResponseError::Csv { .. }) => FailureKind::Parse,
            SkyfeedError::Response(ResponseError::MissingField { .. })
            | SkyfeedError::Response(ResponseError::NotTabular { .. }) => FailureKind::Shape,
            SkyfeedError::Validation(_) => FailureKind::Validation,
            SkyfeedError::Config(_) => FailureKind::Config,
        }
    }
}

/// Result type alias for SKYFEED operations.
pub type SkyfeedResult<T> = Result<T, SkyfeedError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_status() {
        let err = HttpError::Status {
            url: "https://api.nasa.gov/planetary/apod".to_string(),
            status: 503,
            attempts: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("5 attempt"));
        assert!(msg.contains("planetary/apod"));
    }

    #[test]
    fn test_response_error_display_missing_field() {
        let err = ResponseError::MissingField {
            endpoint: "neo_feed".to_string(),
            path: "/close_approach_data/0/orbiting_body".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("neo_feed"));
        assert!(msg.contains("orbiting_body"));
    }

    #[test]
    fn test_validation_error_display_unsupported_format() {
        let err = ValidationError::UnsupportedFormat {
            format: "ipac".to_string(),
        };
        assert!(format!("{}", err).contains("ipac"));
    }

    #[test]
    fn test_error_kind_classification() {
        let network = SkyfeedError::from(HttpError::Transport {
            url: "u".to_string(),
            reason: "connection refused".to_string(),
        });
        assert_eq!(network.kind(), FailureKind::Network);

        let timeout = SkyfeedError::from(HttpError::Timeout {
            url: "u".to_string(),
            timeout: Duration::from_secs(30),
        });
        assert_eq!(timeout.kind(), FailureKind::Network);

        let status = SkyfeedError::from(HttpError::Status {
            url: "u".to_string(),
            status: 404,
            attempts: 1,
        });
        assert_eq!(status.kind(), FailureKind::Status);

        let decode = SkyfeedError::from(ResponseError::Decode {
            endpoint: "apod".to_string(),
            reason: "eof".to_string(),
        });
        assert_eq!(decode.kind(), FailureKind::Parse);

        let shape = SkyfeedError::from(ResponseError::NotTabular {
            reason: "nested".to_string(),
        });
        assert_eq!(shape.kind(), FailureKind::Shape);

        let validation = SkyfeedError::from(ValidationError::UnsupportedFormat {
            format: "votable".to_string(),
        });
        assert_eq!(validation.kind(), FailureKind::Validation);

        let config = SkyfeedError::from(ConfigError::MissingRequired {
            field: "api_key".to_string(),
        });
        assert_eq!(config.kind(), FailureKind::Config);
    }
}
