//! Fetch a trip from the API and print its journey as JSON.
//!
//! Run with: cargo run --example fetch_trip --features http -- http://localhost:8000/api 42

use trip_journey::TripFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| "http://localhost:8000/api".to_string());
    let trip_id: i64 = args.next().as_deref().unwrap_or("1").parse()?;

    let fetcher = TripFetcher::new(&base_url)?;
    let journey = fetcher.fetch_journey(trip_id).await?;

    if journey.is_empty() {
        println!("No location data available for trip {}", trip_id);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&journey)?);
    Ok(())
}
