//! Batch journey processing across many trips.
//!
//! Run with: cargo run --example batch_trips --features parallel

use std::time::Instant;
use trip_journey::{
    process_trips, process_trips_parallel, EventType, JourneyConfig, Location, Trip, TripEvent,
};

fn synthetic_trip(id: i64) -> Trip {
    let at = |loc_id: i64, lat: f64, lng: f64| Location {
        id: loc_id,
        latitude: Some(lat),
        longitude: Some(lng),
        ..Default::default()
    };

    let base_lat = 35.0 + (id % 10) as f64;
    let base_lng = -100.0 + (id % 17) as f64;

    let events = (0..24)
        .map(|hour| TripEvent {
            id: id * 100 + hour,
            event_type: if hour % 4 == 3 { EventType::RestBreak } else { EventType::Driving },
            timestamp: format!("2024-03-01T{:02}:00:00Z", 23 - hour),
            duration: 1.0,
            miles_driven: if hour % 4 == 3 { 0.0 } else { 55.0 },
            location: Some(at(id * 100 + hour, base_lat + hour as f64 * 0.1, base_lng + hour as f64 * 0.05).into()),
            notes: None,
            unrecognized_type: None,
        })
        .collect();

    Trip {
        id,
        origin_location: Some(at(id * 10, base_lat - 0.1, base_lng).into()),
        destination_location: Some(at(id * 10 + 1, base_lat + 2.5, base_lng + 1.2).into()),
        events,
        ..Default::default()
    }
}

fn main() {
    env_logger::init();

    let trips: Vec<Trip> = (0..2000).map(synthetic_trip).collect();
    let config = JourneyConfig::default();

    let start = Instant::now();
    let sequential = process_trips(&trips, &config);
    let sequential_elapsed = start.elapsed();

    let start = Instant::now();
    let parallel = process_trips_parallel(&trips, &config);
    let parallel_elapsed = start.elapsed();

    let ok = parallel.iter().filter(|r| r.success).count();
    let points: usize = parallel
        .iter()
        .filter_map(|r| r.journey.as_ref())
        .map(|j| j.route_coordinates.len())
        .sum();

    println!("Trips:        {}", trips.len());
    println!("Succeeded:    {}", ok);
    println!("Route points: {}", points);
    println!("Sequential:   {:?}", sequential_elapsed);
    println!("Parallel:     {:?}", parallel_elapsed);
    println!("Same output:  {}", sequential == parallel);
}
