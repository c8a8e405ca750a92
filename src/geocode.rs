//! Free-text location resolution.
//!
//! [`Geocoder`] turns a checkpoint's location string ("Newark, NJ, USA")
//! into coordinates via a forward-geocoding HTTP provider, memoizing every
//! successful lookup for the life of the process. Repeated payloads for the
//! same shipment hit the same handful of cities, so the cache is unbounded
//! and never invalidated.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::models::{Coordinates, GeocodeResponse};

pub struct Geocoder {
    client: Client,
    endpoint: String,
    key: String,
    cache: Mutex<HashMap<String, Coordinates>>,
}

impl Geocoder {
    pub fn new(endpoint: String, key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            endpoint,
            key,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a location string to (lat, lng).
    ///
    /// Blank input and cache hits never touch the network. Every failure
    /// mode (provider error status, malformed body, empty result set,
    /// transport error) collapses to `None`; failed lookups are not cached,
    /// so a later payload gets another chance at the same location.
    pub async fn resolve(&self, location: &str) -> Option<Coordinates> {
        if location.trim().is_empty() {
            return None;
        }

        if let Some(hit) = self.cache.lock().unwrap().get(location).copied() {
            debug!("Geocode cache hit for '{}'", location);
            return Some(hit);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", location), ("key", self.key.as_str())])
            .send()
            .await;

        let parsed: GeocodeResponse = match response {
            Ok(res) => match res.error_for_status() {
                Ok(res) => match res.json().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("Malformed geocoding response for '{}': {}", location, e);
                        return None;
                    }
                },
                Err(e) => {
                    warn!("Geocoding provider rejected '{}': {}", location, e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Geocoding request for '{}' failed: {}", location, e);
                return None;
            }
        };

        let first = match parsed.results.into_iter().next() {
            Some(result) => result,
            None => {
                debug!("Geocoding provider found no match for '{}'", location);
                return None;
            }
        };

        let coords = (first.geometry.lat, first.geometry.lng);
        self.cache
            .lock()
            .unwrap()
            .insert(location.to_string(), coords);
        Some(coords)
    }

    /// Number of memoized locations, surfaced in the telemetry panel.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocode_body(lat: f64, lng: f64) -> serde_json::Value {
        json!({ "results": [ { "geometry": { "lat": lat, "lng": lng } } ] })
    }

    #[tokio::test]
    async fn resolves_and_memoizes_successful_lookups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .and(query_param("q", "Boston, MA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(42.3601, -71.0589)))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(format!("{}/geocode", server.uri()), "test-key".into());

        let first = geocoder.resolve("Boston, MA").await;
        let second = geocoder.resolve("Boston, MA").await;

        assert_eq!(first, Some((42.3601, -71.0589)));
        assert_eq!(second, first);
        assert_eq!(geocoder.cached_len(), 1);
        // expect(1) on the mock verifies the second call never hit the wire
    }

    #[tokio::test]
    async fn blank_location_short_circuits_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(0.0, 0.0)))
            .expect(0)
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(format!("{}/geocode", server.uri()), "test-key".into());

        assert_eq!(geocoder.resolve("").await, None);
        assert_eq!(geocoder.resolve("   ").await, None);
        assert_eq!(geocoder.cached_len(), 0);
    }

    #[tokio::test]
    async fn empty_result_set_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(format!("{}/geocode", server.uri()), "test-key".into());

        // Both calls must reach the provider: a miss is never memoized.
        assert_eq!(geocoder.resolve("Atlantis").await, None);
        assert_eq!(geocoder.resolve("Atlantis").await, None);
        assert_eq!(geocoder.cached_len(), 0);
    }

    #[tokio::test]
    async fn provider_error_status_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(format!("{}/geocode", server.uri()), "test-key".into());
        assert_eq!(geocoder.resolve("Boston, MA").await, None);
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(format!("{}/geocode", server.uri()), "test-key".into());
        assert_eq!(geocoder.resolve("Boston, MA").await, None);
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_to_none() {
        // Nothing listens on this port.
        let geocoder = Geocoder::new("http://127.0.0.1:9".into(), "test-key".into());
        assert_eq!(geocoder.resolve("Boston, MA").await, None);
    }
}
