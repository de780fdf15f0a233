//! # Trip Journey
//!
//! Journey geometry and statistics for fleet trip logs.
//!
//! This library provides:
//! - Map positions for a trip's origin, logged events and destination
//! - Route segments tagged with the event type that ends them
//! - A smoothed polyline for rendering without road-network data
//! - Per-trip event statistics
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch processing with rayon
//! - **`http`** - Enable HTTP client for fetching trips from the REST API
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_journey::{process_journey, Trip};
//!
//! let trip: Trip = serde_json::from_str(r#"{
//!     "id": 1,
//!     "origin_location": {"id": 10, "latitude": 41.8781, "longitude": -87.6298},
//!     "destination_location": {"id": 11, "latitude": 39.7684, "longitude": -86.1581},
//!     "events": [
//!         {"id": 100, "event_type": "driving", "timestamp": "2024-03-01T08:00:00Z",
//!          "duration": 3.0, "miles_driven": 180.0,
//!          "location": {"id": 12, "latitude": 40.4167, "longitude": -86.8753}}
//!     ]
//! }"#).unwrap();
//!
//! let journey = process_journey(&trip, &trip.events).unwrap();
//! assert_eq!(journey.positions.len(), 3);
//! assert_eq!(journey.segments.len(), 2);
//! assert_eq!(journey.statistics.total_distance, 180.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod error;
pub use error::{JourneyError, Result};

pub mod geo_utils;

// Position extraction, segmentation, smoothing and statistics
pub mod journey;
pub use journey::{
    journey_positions, journey_positions_with_config, journey_statistics, on_duty_hours,
    process_journey, process_journey_with_config, route_segments, route_segments_with_config,
    smooth_route, smooth_route_with_config, JourneyData, JourneyStatistics, MapPosition,
    PlottedEvent, PositionData, PositionKind, RouteSegment,
};

pub mod validation;
pub use validation::{validate_event, validate_location};

pub mod view;
pub use view::{fit_view, MapView, ViewConfig};

mod serde_util;

// HTTP module for trip fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FetcherConfig, TripFetcher};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use trip_journey::GpsPoint;
/// let point = GpsPoint::new(41.8781, -87.6298); // Chicago
/// assert_eq!(point.to_array(), [41.8781, -87.6298]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// `[lat, lng]` pair, the shape map polylines consume.
    pub fn to_array(self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Bounding box of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A geocoded place as stored by the API.
///
/// Coordinates are optional in practice. The API may send them as numbers,
/// decimal strings or `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default, deserialize_with = "serde_util::optional_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "serde_util::optional_f64")]
    pub longitude: Option<f64>,
}

impl Location {
    /// Coordinates if both are present and finite. Zero counts as present.
    pub fn coordinates(&self) -> Option<GpsPoint> {
        let lat = self.latitude.filter(|v| v.is_finite())?;
        let lng = self.longitude.filter(|v| v.is_finite())?;
        Some(GpsPoint::new(lat, lng))
    }
}

/// A location field that is either embedded or a bare id reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationRef {
    Resolved(Location),
    Unresolved(i64),
}

impl LocationRef {
    /// The resolved location, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            LocationRef::Resolved(location) => Some(location),
            LocationRef::Unresolved(_) => None,
        }
    }

    /// Id of the referenced location, resolved or not.
    pub fn id(&self) -> i64 {
        match self {
            LocationRef::Resolved(location) => location.id,
            LocationRef::Unresolved(id) => *id,
        }
    }

    /// Coordinates of a resolved location. Bare references have none.
    pub fn coordinates(&self) -> Option<GpsPoint> {
        self.location().and_then(Location::coordinates)
    }

    /// Replace a bare reference with its location from `lookup`.
    ///
    /// Already-resolved values and ids missing from `lookup` are returned unchanged.
    pub fn resolved_with(&self, lookup: &HashMap<i64, Location>) -> LocationRef {
        match self {
            LocationRef::Unresolved(id) => match lookup.get(id) {
                Some(location) => LocationRef::Resolved(location.clone()),
                None => LocationRef::Unresolved(*id),
            },
            resolved => resolved.clone(),
        }
    }
}

impl From<Location> for LocationRef {
    fn from(location: Location) -> Self {
        LocationRef::Resolved(location)
    }
}

/// Category of a logged event.
///
/// Deserializing an unknown name fails. [`TripEvent`] is lenient instead: it
/// maps unknown categories to [`EventType::Other`] and keeps the raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Driving,
    OnDuty,
    OffDuty,
    Sleeper,
    RestBreak,
    FuelStop,
    MealBreak,
    Inspection,
    Loading,
    Unloading,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 11] = [
        EventType::Driving,
        EventType::OnDuty,
        EventType::OffDuty,
        EventType::Sleeper,
        EventType::RestBreak,
        EventType::FuelStop,
        EventType::MealBreak,
        EventType::Inspection,
        EventType::Loading,
        EventType::Unloading,
        EventType::Other,
    ];

    /// Wire name, as used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Driving => "driving",
            EventType::OnDuty => "on_duty",
            EventType::OffDuty => "off_duty",
            EventType::Sleeper => "sleeper",
            EventType::RestBreak => "rest_break",
            EventType::FuelStop => "fuel_stop",
            EventType::MealBreak => "meal_break",
            EventType::Inspection => "inspection",
            EventType::Loading => "loading",
            EventType::Unloading => "unloading",
            EventType::Other => "other",
        }
    }

    /// Look up a category by wire name.
    pub fn from_wire(name: &str) -> Option<EventType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn is_driving(&self) -> bool {
        matches!(self, EventType::Driving)
    }

    /// Rest categories: rest break, sleeper berth and off duty.
    pub fn is_rest(&self) -> bool {
        matches!(
            self,
            EventType::RestBreak | EventType::Sleeper | EventType::OffDuty
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped Hours-of-Service event logged during a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTripEvent")]
pub struct TripEvent {
    pub id: i64,
    pub event_type: EventType,
    /// ISO 8601 date-time as sent by the API
    pub timestamp: String,
    /// Duration in hours (0-24)
    pub duration: f64,
    pub miles_driven: f64,
    pub location: Option<LocationRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Category name the API sent when it is not a known [`EventType`].
    /// `event_type` is then [`EventType::Other`].
    #[serde(skip_serializing)]
    pub unrecognized_type: Option<String>,
}

/// Wire shape of [`TripEvent`], with the category still a plain string.
#[derive(Deserialize)]
struct RawTripEvent {
    id: i64,
    event_type: String,
    timestamp: String,
    #[serde(default, deserialize_with = "serde_util::lenient_f64")]
    duration: f64,
    #[serde(default, deserialize_with = "serde_util::lenient_f64")]
    miles_driven: f64,
    #[serde(default)]
    location: Option<LocationRef>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<RawTripEvent> for TripEvent {
    fn from(raw: RawTripEvent) -> Self {
        let (event_type, unrecognized_type) = match EventType::from_wire(&raw.event_type) {
            Some(event_type) => (event_type, None),
            None => (EventType::Other, Some(raw.event_type)),
        };
        TripEvent {
            id: raw.id,
            event_type,
            timestamp: raw.timestamp,
            duration: raw.duration,
            miles_driven: raw.miles_driven,
            location: raw.location,
            notes: raw.notes,
            unrecognized_type,
        }
    }
}

impl TripEvent {
    /// Parse the event timestamp.
    ///
    /// Accepts RFC 3339, other ISO 8601 offset forms, and offset-less forms
    /// (read as UTC).
    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>> {
        journey::parse_timestamp(&self.timestamp).ok_or_else(|| {
            JourneyError::MalformedTimestamp {
                event_id: self.id,
                timestamp: self.timestamp.clone(),
                message: "expected an ISO 8601 date-time".to_string(),
            }
        })
    }

    /// Coordinates of the event's location, when resolved and complete.
    pub fn coordinates(&self) -> Option<GpsPoint> {
        self.location.as_ref().and_then(LocationRef::coordinates)
    }
}

/// A driver's dispatched journey.
///
/// Only the origin, destination and events feed the journey geometry. The
/// remaining fields are carried for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    #[serde(default)]
    pub origin_location: Option<LocationRef>,
    #[serde(default)]
    pub destination_location: Option<LocationRef>,
    #[serde(default)]
    pub events: Vec<TripEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_info: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "serde_util::optional_f64")]
    pub total_miles_driving: Option<f64>,
    #[serde(default, deserialize_with = "serde_util::optional_f64")]
    pub total_driving_hours: Option<f64>,
}

/// Configuration for journey geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyConfig {
    /// Destination is dropped when the preceding position is within this many
    /// degrees in both latitude and longitude.
    /// Default: 0.001
    pub duplicate_threshold_degrees: f64,

    /// Interpolated points per kilometre of segment when smoothing.
    /// Default: 50.0
    pub interpolation_points_per_km: f64,

    /// Cap on interpolated points per segment.
    /// Default: 6
    pub max_interpolated_points: u32,

    /// Sphere radius for haversine distances.
    /// Default: 6371.0 km
    pub earth_radius_km: f64,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold_degrees: 0.001,
            interpolation_points_per_km: 50.0,
            max_interpolated_points: 6,
            earth_radius_km: geo_utils::EARTH_RADIUS_KM,
        }
    }
}

/// Replace bare location references on a trip and its events.
///
/// Returns the number of references that stayed unresolved.
pub fn resolve_references(
    trip: &mut Trip,
    events: &mut [TripEvent],
    lookup: &HashMap<i64, Location>,
) -> usize {
    let slots = trip
        .origin_location
        .iter_mut()
        .chain(trip.destination_location.iter_mut())
        .chain(events.iter_mut().filter_map(|e| e.location.as_mut()));

    let mut unresolved = 0;
    for slot in slots {
        *slot = slot.resolved_with(lookup);
        if matches!(slot, LocationRef::Unresolved(_)) {
            unresolved += 1;
        }
    }
    unresolved
}

// ============================================================================
// Batch Processing
// ============================================================================

/// Journey result for one trip of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripJourney {
    pub trip_id: i64,
    pub journey: Option<JourneyData>,
    pub success: bool,
    pub error: Option<String>,
}

impl TripJourney {
    fn from_result(trip_id: i64, result: Result<JourneyData>) -> Self {
        match result {
            Ok(journey) => Self {
                trip_id,
                journey: Some(journey),
                success: true,
                error: None,
            },
            Err(e) => {
                log::warn!("[TripJourney] Trip {} failed: {}", trip_id, e);
                Self {
                    trip_id,
                    journey: None,
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Process a batch of trips, each with its embedded events.
///
/// A failing trip is reported in its own result and does not abort the batch.
///
/// # Example
/// ```
/// use trip_journey::{process_trips, Trip};
///
/// let trips = vec![Trip { id: 1, ..Default::default() }, Trip { id: 2, ..Default::default() }];
/// let results = process_trips(&trips, &Default::default());
/// assert_eq!(results.len(), 2);
/// assert!(results.iter().all(|r| r.success));
/// ```
pub fn process_trips(trips: &[Trip], config: &JourneyConfig) -> Vec<TripJourney> {
    trips
        .iter()
        .map(|trip| {
            TripJourney::from_result(
                trip.id,
                process_journey_with_config(trip, &trip.events, config),
            )
        })
        .collect()
}

/// Process trips using parallel processing.
///
/// This is the same as `process_trips` but uses rayon. Output order matches
/// input order. Recommended for large trip lists.
#[cfg(feature = "parallel")]
pub fn process_trips_parallel(trips: &[Trip], config: &JourneyConfig) -> Vec<TripJourney> {
    use rayon::prelude::*;

    trips
        .par_iter()
        .map(|trip| {
            TripJourney::from_result(
                trip.id,
                process_journey_with_config(trip, &trip.events, config),
            )
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
