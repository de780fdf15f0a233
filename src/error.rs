//! Unified error handling for the trip-journey library.
//!
//! Missing coordinates and unresolved location references are not errors:
//! they degrade to fewer plotted positions. Only inputs that would silently
//! corrupt the journey (unparseable timestamps) or that fail explicit
//! validation surface here.

use std::fmt;

/// Unified error type for trip-journey operations.
#[derive(Debug, Clone, PartialEq)]
pub enum JourneyError {
    /// Event timestamp could not be parsed as an ISO 8601 date-time
    MalformedTimestamp {
        event_id: i64,
        timestamp: String,
        message: String,
    },
    /// Event failed validation
    InvalidEvent {
        event_id: i64,
        field: &'static str,
        message: String,
    },
    /// Location has out-of-range or non-finite coordinates
    InvalidCoordinates { location_id: i64, message: String },
    /// Location failed a non-coordinate field check
    InvalidLocation {
        location_id: i64,
        field: &'static str,
        message: String,
    },
    /// HTTP/API error
    Http {
        message: String,
        status_code: Option<u16>,
    },
    /// JSON encoding/decoding error
    Json { message: String },
}

impl JourneyError {
    /// Event id the error is attributable to, if any.
    pub fn event_id(&self) -> Option<i64> {
        match self {
            JourneyError::MalformedTimestamp { event_id, .. }
            | JourneyError::InvalidEvent { event_id, .. } => Some(*event_id),
            _ => None,
        }
    }
}

impl fmt::Display for JourneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JourneyError::MalformedTimestamp {
                event_id,
                timestamp,
                message,
            } => {
                write!(
                    f,
                    "Event {} has malformed timestamp '{}': {}",
                    event_id, timestamp, message
                )
            }
            JourneyError::InvalidEvent {
                event_id,
                field,
                message,
            } => {
                write!(f, "Event {} has invalid {}: {}", event_id, field, message)
            }
            JourneyError::InvalidCoordinates {
                location_id,
                message,
            } => {
                write!(
                    f,
                    "Location {} has invalid coordinates: {}",
                    location_id, message
                )
            }
            JourneyError::InvalidLocation {
                location_id,
                field,
                message,
            } => {
                write!(
                    f,
                    "Location {} has invalid {}: {}",
                    location_id, field, message
                )
            }
            JourneyError::Http {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "HTTP error ({}): {}", code, message)
                } else {
                    write!(f, "HTTP error: {}", message)
                }
            }
            JourneyError::Json { message } => {
                write!(f, "JSON error: {}", message)
            }
        }
    }
}

impl std::error::Error for JourneyError {}

impl From<serde_json::Error> for JourneyError {
    fn from(err: serde_json::Error) -> Self {
        JourneyError::Json {
            message: err.to_string(),
        }
    }
}

/// Result type alias for trip-journey operations.
pub type Result<T> = std::result::Result<T, JourneyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JourneyError::MalformedTimestamp {
            event_id: 42,
            timestamp: "yesterday".to_string(),
            message: "input contains invalid characters".to_string(),
        };
        assert!(err.to_string().contains("Event 42"));
        assert!(err.to_string().contains("yesterday"));
        assert_eq!(err.event_id(), Some(42));
    }

    #[test]
    fn test_http_display_with_status() {
        let err = JourneyError::Http {
            message: "not found".to_string(),
            status_code: Some(404),
        };
        assert_eq!(err.to_string(), "HTTP error (404): not found");
        assert_eq!(err.event_id(), None);
    }

    #[test]
    fn test_location_display_names_field() {
        let err = JourneyError::InvalidLocation {
            location_id: 7,
            field: "address",
            message: "Address is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Location 7 has invalid address: Address is required"
        );
        assert_eq!(err.event_id(), None);
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<i64, _> = serde_json::from_str("not json");
        let err: JourneyError = parse.unwrap_err().into();
        assert!(matches!(err, JourneyError::Json { .. }));
    }
}
