//! Error types for Pulse core.

use std::{error::Error, fmt, io};

/// Error type for Pulse operations.
#[derive(Debug)]
pub enum PulseError {
    /// A requested record does not exist upstream.
    NotFound(String),
    /// Required command input was missing or malformed.
    Validation(String),
    /// A data or reasoning gateway call failed.
    Gateway(String),
    /// A local JSON serialization error.
    Json(serde_json::Error),
    /// An underlying I/O error.
    Io(io::Error),
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::Gateway(message) => write!(f, "gateway error: {message}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for PulseError {}

impl From<serde_json::Error> for PulseError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<io::Error> for PulseError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for Pulse core.
pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::PulseError;
    use std::io;

    #[test]
    fn not_found_formats_message() {
        let error = PulseError::NotFound("issue ENG-404".to_string());
        assert_eq!(format!("{error}"), "not found: issue ENG-404");
    }

    #[test]
    fn validation_formats_message() {
        let error = PulseError::Validation("cycle name is required".to_string());
        assert_eq!(format!("{error}"), "invalid input: cycle name is required");
    }

    #[test]
    fn gateway_formats_message() {
        let error = PulseError::Gateway("status 502".to_string());
        assert_eq!(format!("{error}"), "gateway error: status 502");
    }

    #[test]
    fn from_json_error_maps_variant() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: PulseError = json_err.into();
        assert!(matches!(error, PulseError::Json(_)));
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: PulseError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            PulseError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io variant, got {other:?}"),
        }
    }
}
