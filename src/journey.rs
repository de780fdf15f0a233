//! Journey geometry and statistics.
//!
//! Turns a trip and its logged events into what a map view draws:
//! - positions (origin, events in time order, destination)
//! - one segment per consecutive pair, tagged with the arriving event's type
//! - a smoothed polyline with linearly interpolated points
//! - event counts and logged mileage
//!
//! Every function here is pure; calling it twice with the same input gives
//! the same output.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use geo::LineString;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{haversine_distance_with_radius, interpolate};
use crate::{EventType, GpsPoint, JourneyConfig, Location, LocationRef, Result, Trip, TripEvent};

/// ISO 8601 forms RFC 3339 rejects: compact `+0000` offsets, hour-only
/// offsets, or a missing seconds field. `%#z` also takes `Z`.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Offset-less forms tried last; read as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ============================================================================
// Types
// ============================================================================

/// What a map position marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    Origin,
    Destination,
    Event,
}

/// An event plotted on the map with its rank among plotted events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottedEvent {
    pub event: TripEvent,
    /// 1-based; events without coordinates do not take a rank
    pub index: u32,
}

/// Payload attached to a map position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionData {
    Event(PlottedEvent),
    Location(Location),
}

/// A plottable point of the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub lat: f64,
    pub lng: f64,
    /// `"origin"`, `"destination"` or `"event-<id>"`
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PositionKind,
    pub data: PositionData,
}

impl MapPosition {
    fn origin(point: GpsPoint, location: &Location) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
            id: "origin".to_string(),
            kind: PositionKind::Origin,
            data: PositionData::Location(location.clone()),
        }
    }

    fn destination(point: GpsPoint, location: &Location) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
            id: "destination".to_string(),
            kind: PositionKind::Destination,
            data: PositionData::Location(location.clone()),
        }
    }

    fn event(point: GpsPoint, event: &TripEvent, index: u32) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
            id: format!("event-{}", event.id),
            kind: PositionKind::Event,
            data: PositionData::Event(PlottedEvent {
                event: event.clone(),
                index,
            }),
        }
    }

    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.lat, self.lng)
    }

    /// The plotted event, for positions of kind `Event`.
    pub fn plotted_event(&self) -> Option<&PlottedEvent> {
        match &self.data {
            PositionData::Event(plotted) => Some(plotted),
            PositionData::Location(_) => None,
        }
    }
}

/// Straight leg between two consecutive positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    /// `[lat, lng]`
    pub start: [f64; 2],
    /// `[lat, lng]`
    pub end: [f64; 2],
    /// Type of the event the segment arrives at; `None` for legs into the destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    /// Great-circle length in kilometres
    pub distance: f64,
}

/// Event counts and logged mileage for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStatistics {
    /// All events, plotted or not
    pub total_events: usize,
    pub driving_events: usize,
    /// Rest break, sleeper berth and off-duty events
    pub rest_events: usize,
    /// Sum of logged `miles_driven`, independent of segment distances
    pub total_distance: f64,
}

/// Everything a map view needs for one trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyData {
    pub positions: Vec<MapPosition>,
    pub route_coordinates: Vec<[f64; 2]>,
    pub segments: Vec<RouteSegment>,
    pub statistics: JourneyStatistics,
}

impl JourneyData {
    /// True when nothing could be plotted.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of segment lengths in kilometres.
    pub fn route_length_km(&self) -> f64 {
        self.segments.iter().map(|s| s.distance).sum()
    }

    /// The smoothed route as a `geo` line string (x = lng, y = lat).
    pub fn route_line(&self) -> LineString<f64> {
        self.route_coordinates
            .iter()
            .map(|&[lat, lng]| (lng, lat))
            .collect::<Vec<_>>()
            .into()
    }
}

// ============================================================================
// Position Extraction
// ============================================================================

/// Positions for a trip with the default [`JourneyConfig`].
pub fn journey_positions(trip: &Trip, events: &[TripEvent]) -> Result<Vec<MapPosition>> {
    journey_positions_with_config(trip, events, &JourneyConfig::default())
}

/// Extract plottable positions in order: origin, events by time, destination.
///
/// Events are ordered by timestamp without touching the caller's slice; equal
/// timestamps keep their input order. Locations without both coordinates and
/// bare location references are skipped. The destination is dropped when the
/// position before it lies within `duplicate_threshold_degrees` on both axes.
///
/// Fails only when an event timestamp cannot be parsed.
pub fn journey_positions_with_config(
    trip: &Trip,
    events: &[TripEvent],
    config: &JourneyConfig,
) -> Result<Vec<MapPosition>> {
    let mut positions = Vec::with_capacity(events.len() + 2);

    if let Some((location, point)) = plottable(trip.origin_location.as_ref()) {
        positions.push(MapPosition::origin(point, location));
    }

    let mut rank = 0;
    let mut skipped = 0;
    for event in events_by_time(events)? {
        match event.coordinates() {
            Some(point) => {
                rank += 1;
                positions.push(MapPosition::event(point, event, rank));
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(
            "[Journey {}] {} of {} events have no plottable location",
            trip.id,
            skipped,
            events.len()
        );
    }

    if let Some((location, point)) = plottable(trip.destination_location.as_ref()) {
        let threshold = config.duplicate_threshold_degrees;
        let duplicate = positions.last().is_some_and(|last| {
            (last.lat - point.latitude).abs() <= threshold
                && (last.lng - point.longitude).abs() <= threshold
        });

        if duplicate {
            debug!("[Journey {}] Destination coincides with last position, omitted", trip.id);
        } else {
            positions.push(MapPosition::destination(point, location));
        }
    }

    Ok(positions)
}

fn plottable(location: Option<&LocationRef>) -> Option<(&Location, GpsPoint)> {
    let location = location?.location()?;
    Some((location, location.coordinates()?))
}

fn events_by_time(events: &[TripEvent]) -> Result<Vec<&TripEvent>> {
    let mut keyed = events
        .iter()
        .map(|e| -> Result<_> { Ok((e.parsed_timestamp()?, e)) })
        .collect::<Result<Vec<_>>>()?;

    // sort_by_key is stable
    keyed.sort_by_key(|(timestamp, _)| *timestamp);

    Ok(keyed.into_iter().map(|(_, e)| e).collect())
}

/// Parse an ISO 8601 timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ============================================================================
// Route Segmentation
// ============================================================================

/// Segments for a position list with the default [`JourneyConfig`].
pub fn route_segments(positions: &[MapPosition]) -> Vec<RouteSegment> {
    route_segments_with_config(positions, &JourneyConfig::default())
}

/// One segment per adjacent pair of positions.
///
/// The segment takes its `event_type` from the position it arrives at.
pub fn route_segments_with_config(
    positions: &[MapPosition],
    config: &JourneyConfig,
) -> Vec<RouteSegment> {
    positions
        .windows(2)
        .map(|pair| {
            let (current, next) = (pair[0].point(), pair[1].point());
            RouteSegment {
                start: current.to_array(),
                end: next.to_array(),
                event_type: pair[1].plotted_event().map(|p| p.event.event_type),
                distance: haversine_distance_with_radius(&current, &next, config.earth_radius_km),
            }
        })
        .collect()
}

// ============================================================================
// Route Smoothing
// ============================================================================

/// Smoothed route with the default [`JourneyConfig`].
pub fn smooth_route(positions: &[MapPosition]) -> Vec<[f64; 2]> {
    smooth_route_with_config(positions, &JourneyConfig::default())
}

/// Densify the route with evenly spaced points between each pair.
///
/// Interpolation is linear in degrees; the result starts and ends at the
/// first and last position. Fewer than two positions are returned as-is.
pub fn smooth_route_with_config(
    positions: &[MapPosition],
    config: &JourneyConfig,
) -> Vec<[f64; 2]> {
    if positions.len() < 2 {
        return positions.iter().map(|p| p.point().to_array()).collect();
    }

    let per_pair = config.max_interpolated_points as usize + 1;
    let mut route = Vec::with_capacity(positions.len() * per_pair);

    for pair in positions.windows(2) {
        let (current, next) = (pair[0].point(), pair[1].point());
        route.push(current.to_array());

        let distance = haversine_distance_with_radius(&current, &next, config.earth_radius_km);
        let count = interpolation_count(distance, config);
        for j in 1..=count {
            let ratio = f64::from(j) / f64::from(count + 1);
            route.push(interpolate(&current, &next, ratio).to_array());
        }
    }

    if let Some(last) = positions.last() {
        route.push(last.point().to_array());
    }

    route
}

/// Number of points to insert into a segment of `distance_km`.
///
/// `min(floor(distance_km * interpolation_points_per_km), max_interpolated_points)`
pub fn interpolation_count(distance_km: f64, config: &JourneyConfig) -> u32 {
    // `as` saturates: negative and NaN become 0
    let wanted = (distance_km * config.interpolation_points_per_km).floor() as u32;
    wanted.min(config.max_interpolated_points)
}

// ============================================================================
// Statistics
// ============================================================================

/// Count events by category and sum logged miles.
pub fn journey_statistics(events: &[TripEvent]) -> JourneyStatistics {
    events
        .iter()
        .fold(JourneyStatistics::default(), |mut stats, event| {
            stats.total_events += 1;
            if event.event_type.is_driving() {
                stats.driving_events += 1;
            }
            if event.event_type.is_rest() {
                stats.rest_events += 1;
            }
            if event.miles_driven.is_finite() {
                stats.total_distance += event.miles_driven;
            }
            stats
        })
}

/// Hours logged as on duty (not driving).
pub fn on_duty_hours(events: &[TripEvent]) -> f64 {
    events
        .iter()
        .filter(|e| e.event_type == EventType::OnDuty && e.duration.is_finite())
        .map(|e| e.duration)
        .sum()
}

// ============================================================================
// Orchestration
// ============================================================================

/// Journey data with the default [`JourneyConfig`].
pub fn process_journey(trip: &Trip, events: &[TripEvent]) -> Result<JourneyData> {
    process_journey_with_config(trip, events, &JourneyConfig::default())
}

/// Compute positions, smoothed route, segments and statistics for a trip.
pub fn process_journey_with_config(
    trip: &Trip,
    events: &[TripEvent],
    config: &JourneyConfig,
) -> Result<JourneyData> {
    let positions = journey_positions_with_config(trip, events, config)?;
    let route_coordinates = smooth_route_with_config(&positions, config);
    let segments = route_segments_with_config(&positions, config);
    let statistics = journey_statistics(events);

    debug!(
        "[Journey {}] {} positions, {} route points, {} segments from {} events",
        trip.id,
        positions.len(),
        route_coordinates.len(),
        segments.len(),
        statistics.total_events
    );

    Ok(JourneyData {
        positions,
        route_coordinates,
        segments,
        statistics,
    })
}

// ============================================================================
// Tests
// ============================================================================
