//! Basic example of computing journey geometry for one trip.
//!
//! Run with: cargo run --example basic_journey

use trip_journey::{fit_view, on_duty_hours, process_journey, Trip, ViewConfig};

const TRIP_JSON: &str = r#"{
    "id": 42,
    "date": "2024-03-01",
    "driver_name": "J. Rivera",
    "origin_location": {"id": 1, "address": "Chicago, IL", "latitude": 41.8781, "longitude": -87.6298},
    "destination_location": {"id": 2, "address": "Indianapolis, IN", "latitude": "39.768400", "longitude": "-86.158100"},
    "events": [
        {"id": 13, "event_type": "fuel_stop", "timestamp": "2024-03-01T10:15:00Z", "duration": 0.5,
         "miles_driven": 0, "location": {"id": 4, "latitude": 40.4167, "longitude": -86.8753}},
        {"id": 11, "event_type": "on_duty", "timestamp": "2024-03-01T07:00:00Z", "duration": 0.5,
         "miles_driven": 0, "location": {"id": 1, "latitude": 41.8781, "longitude": -87.6298}},
        {"id": 12, "event_type": "driving", "timestamp": "2024-03-01T07:30:00Z", "duration": 2.5,
         "miles_driven": 120, "location": 3},
        {"id": 14, "event_type": "driving", "timestamp": "2024-03-01T10:45:00Z", "duration": 1.5,
         "miles_driven": 65, "location": {"id": 2, "latitude": 39.7684, "longitude": -86.1581}}
    ]
}"#;

fn main() {
    let trip: Trip = match serde_json::from_str(TRIP_JSON) {
        Ok(trip) => trip,
        Err(e) => {
            eprintln!("Bad trip JSON: {}", e);
            return;
        }
    };

    let journey = match process_journey(&trip, &trip.events) {
        Ok(journey) => journey,
        Err(e) => {
            eprintln!("Journey failed: {}", e);
            return;
        }
    };

    println!("Trip {} ({} events)\n", trip.id, trip.events.len());

    println!("Positions:");
    for position in &journey.positions {
        println!("  {:<12} {:>9.4}, {:>9.4}", position.id, position.lat, position.lng);
    }

    println!("\nSegments:");
    for segment in &journey.segments {
        let kind = segment.event_type.map_or("-".to_string(), |t| t.to_string());
        println!("  {:<10} {:>7.1} km", kind, segment.distance);
    }

    println!("\nRoute points: {}", journey.route_coordinates.len());
    println!("Route length: {:.1} km", journey.route_length_km());
    println!("Statistics:   {:?}", journey.statistics);
    println!("On duty:      {:.1}h", on_duty_hours(&trip.events));
    println!("View:         {:?}", fit_view(&journey.positions, &ViewConfig::default()));

    match serde_json::to_string_pretty(&journey.statistics) {
        Ok(json) => println!("\n{}", json),
        Err(e) => eprintln!("Serialization failed: {}", e),
    }
}
