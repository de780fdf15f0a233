//! End-to-end journey processing from API-shaped JSON.

use serde_json::json;
use trip_journey::{
    journey_positions, process_journey, smooth_route, EventType, JourneyData, JourneyError,
    PositionKind, Trip, TripEvent,
};

fn trip_from(value: serde_json::Value) -> Trip {
    serde_json::from_value(value).unwrap()
}

fn sample_trip() -> Trip {
    trip_from(json!({
        "id": 7,
        "driver_name": "A. Chen",
        "is_completed": true,
        "total_miles_driving": "185.00",
        "origin_location": {
            "id": 1, "address": "100 W Randolph St", "city": "Chicago", "state": "IL",
            "country": "US", "postal_code": "60601",
            "latitude": 41.8847, "longitude": -87.6324
        },
        "destination_location": {
            "id": 2, "address": "1 Monument Cir", "city": "Indianapolis", "state": "IN",
            "country": "US", "postal_code": "46204",
            "latitude": "39.768400", "longitude": "-86.158100"
        },
        "events": [
            {"id": 30, "event_type": "driving", "timestamp": "2024-03-01T11:00:00Z",
             "duration": 1.5, "miles_driven": 65,
             "location": {"id": 2, "latitude": 39.7684, "longitude": -86.1581}},
            {"id": 10, "event_type": "driving", "timestamp": "2024-03-01T07:30:00Z",
             "duration": 2.5, "miles_driven": 120,
             "location": {"id": 5, "latitude": 40.9, "longitude": -87.1}},
            {"id": 20, "event_type": "rest_break", "timestamp": "2024-03-01T10:00:00Z",
             "duration": 0.5, "miles_driven": 0, "location": 6, "notes": "Rest area"},
            {"id": 25, "event_type": "fuel_stop", "timestamp": "2024-03-01T10:30:00Z",
             "duration": 0.25, "miles_driven": 0,
             "location": {"id": 7, "address": "unknown", "latitude": null, "longitude": null}}
        ]
    }))
}

#[test]
fn journey_from_api_json() {
    let trip = sample_trip();
    let journey = process_journey(&trip, &trip.events).unwrap();

    // origin, event 10, event 30; destination coincides with event 30
    let ids: Vec<&str> = journey.positions.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["origin", "event-10", "event-30"]);

    assert_eq!(journey.segments.len(), journey.positions.len() - 1);
    assert_eq!(journey.segments[0].event_type, Some(EventType::Driving));

    assert_eq!(journey.statistics.total_events, 4);
    assert_eq!(journey.statistics.driving_events, 2);
    assert_eq!(journey.statistics.rest_events, 1);
    assert_eq!(journey.statistics.total_distance, 185.0);
    assert!(
        journey.statistics.driving_events + journey.statistics.rest_events
            <= journey.statistics.total_events
    );
}

#[test]
fn route_endpoints_match_positions() {
    let trip = sample_trip();
    let journey = process_journey(&trip, &trip.events).unwrap();

    let first = journey.positions.first().unwrap();
    let last = journey.positions.last().unwrap();
    assert_eq!(journey.route_coordinates[0], [first.lat, first.lng]);
    assert_eq!(*journey.route_coordinates.last().unwrap(), [last.lat, last.lng]);
    // every leg here is long enough for the full 6 interpolated points
    assert_eq!(journey.route_coordinates.len(), journey.positions.len() + 6 * journey.segments.len());
}

#[test]
fn output_json_uses_map_field_names() {
    let trip = sample_trip();
    let journey = process_journey(&trip, &trip.events).unwrap();
    let value = serde_json::to_value(&journey).unwrap();

    assert!(value["routeCoordinates"].is_array());
    assert_eq!(value["statistics"]["totalEvents"], 4);
    assert_eq!(value["statistics"]["restEvents"], 1);
    assert_eq!(value["segments"][0]["eventType"], "driving");
    assert_eq!(value["positions"][0]["type"], "origin");
    assert_eq!(value["positions"][1]["data"]["index"], 1);
    assert_eq!(value["positions"][1]["data"]["event"]["id"], 10);
}

#[test]
fn destination_duplicate_of_last_event_is_dropped() {
    let trip = trip_from(json!({
        "id": 1,
        "origin_location": {"id": 1, "latitude": 10.0, "longitude": 20.0},
        "destination_location": {"id": 2, "latitude": 10.0, "longitude": 20.0},
        "events": [
            {"id": 5, "event_type": "driving", "timestamp": "2024-03-01T08:00:00Z",
             "miles_driven": 1, "location": {"id": 3, "latitude": 10.0, "longitude": 20.0}}
        ]
    }));

    let positions = journey_positions(&trip, &trip.events).unwrap();

    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].kind, PositionKind::Origin);
    assert_eq!(positions[1].kind, PositionKind::Event);
}

#[test]
fn no_plottable_positions() {
    let trip = trip_from(json!({
        "id": 3,
        "origin_location": 11,
        "destination_location": null,
        "events": [
            {"id": 1, "event_type": "off_duty", "timestamp": "2024-03-01T00:00:00Z", "location": 4}
        ]
    }));

    let journey = process_journey(&trip, &trip.events).unwrap();

    assert!(journey.is_empty());
    assert!(journey.route_coordinates.is_empty());
    assert!(journey.segments.is_empty());
    assert_eq!(journey.statistics.total_events, 1);
    assert_eq!(journey.statistics.rest_events, 1);
}

#[test]
fn single_position_route() {
    let trip = trip_from(json!({
        "id": 4,
        "origin_location": {"id": 1, "latitude": 0.0, "longitude": 0.0}
    }));

    let journey = process_journey(&trip, &[]).unwrap();

    assert_eq!(journey.positions.len(), 1);
    assert_eq!(journey.route_coordinates, vec![[0.0, 0.0]]);
    assert!(journey.segments.is_empty());
    assert_eq!(smooth_route(&journey.positions), journey.route_coordinates);
}

#[test]
fn malformed_timestamp_is_reported() {
    let trip = trip_from(json!({"id": 5}));
    let events: Vec<TripEvent> = serde_json::from_value(json!([
        {"id": 1, "event_type": "driving", "timestamp": "2024-03-01T08:00:00Z", "miles_driven": 10},
        {"id": 2, "event_type": "driving", "timestamp": "03/01/2024 9am", "miles_driven": 10}
    ]))
    .unwrap();

    let err = process_journey(&trip, &events).unwrap_err();

    assert_eq!(err.event_id(), Some(2));
    assert!(matches!(err, JourneyError::MalformedTimestamp { .. }));
}

#[test]
fn journey_json_round_trip_is_exact() {
    let trip = sample_trip();
    let journey = process_journey(&trip, &trip.events).unwrap();
    assert!(journey.route_coordinates.len() > journey.positions.len());

    let json = serde_json::to_string(&journey).unwrap();
    let restored: JourneyData = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.route_coordinates, journey.route_coordinates);
    assert_eq!(restored, journey);
}
