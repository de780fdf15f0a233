//! Field checks for events and locations, matching the rules the logging
//! form enforces before an event reaches the API.
//!
//! Validation is opt-in. Journey processing never calls it, so stored data
//! that predates a rule still renders.

use crate::{EventType, GpsPoint, JourneyError, Location, Result, TripEvent};

/// Longest loggable event, in hours.
pub const MAX_EVENT_HOURS: f64 = 24.0;

/// Longest accepted address, in characters.
pub const MAX_ADDRESS_CHARS: usize = 255;

/// Check an event's category, duration, mileage and timestamp.
///
/// # Example
/// ```
/// use trip_journey::{validate_event, EventType, TripEvent};
///
/// let event = TripEvent {
///     id: 1,
///     event_type: EventType::Driving,
///     timestamp: "2024-03-01T08:00:00Z".to_string(),
///     duration: 2.5,
///     miles_driven: 0.0,
///     location: None,
///     notes: None,
///     unrecognized_type: None,
/// };
/// // Driving events need miles
/// assert!(validate_event(&event).is_err());
/// ```
pub fn validate_event(event: &TripEvent) -> Result<()> {
    let invalid = |field: &'static str, message: &str| JourneyError::InvalidEvent {
        event_id: event.id,
        field,
        message: message.to_string(),
    };

    if let Some(name) = &event.unrecognized_type {
        return Err(invalid(
            "event_type",
            &format!("'{}' is not a valid event type", name),
        ));
    }

    if !event.duration.is_finite() || event.duration < 0.0 {
        return Err(invalid("duration", "must be zero or positive"));
    }
    if event.duration > MAX_EVENT_HOURS {
        return Err(invalid("duration", "cannot exceed 24 hours"));
    }
    if !event.miles_driven.is_finite() || event.miles_driven < 0.0 {
        return Err(invalid("miles_driven", "must be zero or positive"));
    }
    if event.event_type == EventType::Driving && event.miles_driven <= 0.0 {
        return Err(invalid(
            "miles_driven",
            "driving events should have miles driven greater than 0",
        ));
    }

    event.parsed_timestamp()?;

    if let Some(location) = event.location.as_ref().and_then(|l| l.location()) {
        validate_location(location)?;
    }

    Ok(())
}

/// Check the address and that present coordinates are finite and on the globe.
///
/// The address must be non-empty and at most 255 characters. Missing
/// coordinates are allowed; they only make the location unplottable.
pub fn validate_location(location: &Location) -> Result<()> {
    let bad_address = |message: &str| JourneyError::InvalidLocation {
        location_id: location.id,
        field: "address",
        message: message.to_string(),
    };

    if location.address.is_empty() {
        return Err(bad_address("Address is required"));
    }
    if location.address.chars().count() > MAX_ADDRESS_CHARS {
        return Err(bad_address("Address is too long"));
    }

    let invalid = |message: String| JourneyError::InvalidCoordinates {
        location_id: location.id,
        message,
    };

    match (location.latitude, location.longitude) {
        (Some(lat), Some(lng)) => {
            if !GpsPoint::new(lat, lng).is_valid() {
                return Err(invalid(format!("({}, {}) is out of range", lat, lng)));
            }
        }
        (Some(lat), None) if !(-90.0..=90.0).contains(&lat) => {
            return Err(invalid(format!("latitude {} is out of range", lat)));
        }
        (None, Some(lng)) if !(-180.0..=180.0).contains(&lng) => {
            return Err(invalid(format!("longitude {} is out of range", lng)));
        }
        _ => {}
    }

    Ok(())
}
