//! HTTP client for the trip-logging REST API.
//!
//! Loads a trip and its events, then resolves bare location references so
//! the journey geometry can plot them:
//! - Connection pooling, shared across lookups
//! - Distinct location ids fetched once, with bounded concurrency
//! - Automatic retry with exponential backoff on 429 and request errors

use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use crate::{
    process_journey, resolve_references, JourneyData, JourneyError, Location, LocationRef,
    Result, Trip, TripEvent,
};

/// Configuration for the trip fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    /// Maximum location lookups in flight.
    /// Default: 8
    pub max_concurrency: usize,

    /// Retries after a 429 or a failed request.
    /// Default: 3
    pub max_retries: u32,

    /// Per-request timeout.
    /// Default: 30s
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            max_retries: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Event listings come back either bare or paginated.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventsResponse {
    List(Vec<TripEvent>),
    Page { results: Vec<TripEvent> },
}

impl EventsResponse {
    fn into_events(self) -> Vec<TripEvent> {
        match self {
            EventsResponse::List(events) | EventsResponse::Page { results: events } => events,
        }
    }
}

/// Backoff before retry number `retry` (1-based): 400ms, 800ms, 1.6s, 3.2s max.
fn backoff(retry: u32) -> Duration {
    Duration::from_millis(200 * (1 << retry.min(4)))
}

/// Fetches trips, events and locations from the API.
pub struct TripFetcher {
    client: Client,
    base_url: String,
    config: FetcherConfig,
}

impl TripFetcher {
    /// Create a fetcher for the API rooted at `base_url` (e.g. `http://host/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, FetcherConfig::default())
    }

    pub fn with_config(base_url: &str, config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.max_concurrency * 2)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(config.timeout)
            .build()
            .map_err(|e| JourneyError::Http {
                message: format!("Failed to create HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /trips/{id}/`
    pub async fn fetch_trip(&self, trip_id: i64) -> Result<Trip> {
        self.get_json(&self.url(&format!("trips/{}/", trip_id))).await
    }

    /// `GET /trip-events/?trip={id}`
    pub async fn fetch_trip_events(&self, trip_id: i64) -> Result<Vec<TripEvent>> {
        let response: EventsResponse = self
            .get_json(&self.url(&format!("trip-events/?trip={}", trip_id)))
            .await?;
        Ok(response.into_events())
    }

    /// `GET /locations/{id}/`
    pub async fn fetch_location(&self, location_id: i64) -> Result<Location> {
        self.get_json(&self.url(&format!("locations/{}/", location_id)))
            .await
    }

    /// Replace bare location references on the trip and events.
    ///
    /// Each distinct id is fetched once. Failed lookups leave the reference
    /// unresolved, so the point is simply not plotted. Returns how many
    /// references stayed unresolved.
    pub async fn resolve_locations(&self, trip: &mut Trip, events: &mut [TripEvent]) -> usize {
        use futures::stream::{self, StreamExt};

        let ids: BTreeSet<i64> = trip
            .origin_location
            .iter()
            .chain(trip.destination_location.iter())
            .chain(events.iter().filter_map(|e| e.location.as_ref()))
            .filter_map(|r| match r {
                LocationRef::Unresolved(id) => Some(*id),
                LocationRef::Resolved(_) => None,
            })
            .collect();

        if ids.is_empty() {
            return 0;
        }

        let start = Instant::now();
        let total = ids.len();

        let lookup: HashMap<i64, Location> = stream::iter(ids)
            .map(|id| async move { (id, self.fetch_location(id).await) })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .filter_map(|(id, result)| async move {
                match result {
                    Ok(location) => Some((id, location)),
                    Err(e) => {
                        warn!("[TripFetcher] Location {} unresolved: {}", id, e);
                        None
                    }
                }
            })
            .collect()
            .await;

        info!(
            "[TripFetcher] Resolved {}/{} locations in {:.2}s",
            lookup.len(),
            total,
            start.elapsed().as_secs_f64()
        );

        resolve_references(trip, events, &lookup)
    }

    /// Fetch a trip and its events, resolve locations and compute the journey.
    pub async fn fetch_journey(&self, trip_id: i64) -> Result<JourneyData> {
        let mut trip = self.fetch_trip(trip_id).await?;
        let mut events = self.fetch_trip_events(trip_id).await?;

        let unresolved = self.resolve_locations(&mut trip, &mut events).await;
        if unresolved > 0 {
            warn!(
                "[TripFetcher] Trip {}: {} location references left unresolved",
                trip_id, unresolved
            );
        }

        process_journey(&trip, &events)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut retries = 0;
        let req_start = Instant::now();

        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        retries += 1;
                        if retries > self.config.max_retries {
                            return Err(JourneyError::Http {
                                message: format!("Max retries exceeded for {}", url),
                                status_code: Some(status.as_u16()),
                            });
                        }

                        let wait = backoff(retries);
                        warn!(
                            "[TripFetcher] 429 Too Many Requests for {}, retry {} with {:?} backoff",
                            url, retries, wait
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(JourneyError::Http {
                            message: format!("GET {} failed", url),
                            status_code: Some(status.as_u16()),
                        });
                    }

                    let bytes = resp.bytes().await.map_err(|e| JourneyError::Http {
                        message: format!("Body download error: {}", e),
                        status_code: Some(status.as_u16()),
                    })?;

                    debug!(
                        "[TripFetcher] GET {} -> {:.1}KB in {:?}",
                        url,
                        bytes.len() as f64 / 1024.0,
                        req_start.elapsed()
                    );

                    return Ok(serde_json::from_slice(&bytes)?);
                }
                Err(e) => {
                    retries += 1;
                    if retries > self.config.max_retries {
                        return Err(JourneyError::Http {
                            message: format!("Request error: {}", e),
                            status_code: None,
                        });
                    }

                    let wait = backoff(retries);
                    warn!(
                        "[TripFetcher] Error for {}: {}, retry {} after {:?}",
                        url, e, retries, wait
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
