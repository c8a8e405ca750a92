//! Driving-route overlay fetching.
//!
//! [`RoutePlanner`] asks a GeoJSON directions provider for a road path
//! through the resolved checkpoints. The provider speaks (lng, lat);
//! everything else in this crate speaks (lat, lng), so the swap happens
//! here, on the way out and on the way back in. A missing route is never
//! an error: the map just draws without an overlay.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::models::{Coordinates, RouteResponse};

pub struct RoutePlanner {
    client: Client,
    endpoint: String,
    key: String,
}

impl RoutePlanner {
    pub fn new(endpoint: String, key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            endpoint,
            key,
        }
    }

    /// Fetches a road path through `waypoints` (in (lat, lng) order).
    ///
    /// Needs at least two waypoints and a configured credential; otherwise
    /// returns `None` without a request. Any provider or transport failure
    /// also returns `None`.
    pub async fn fetch_route(&self, waypoints: &[Coordinates]) -> Option<Vec<Coordinates>> {
        if waypoints.len() < 2 {
            return None;
        }
        if self.key.trim().is_empty() {
            debug!("No routing credential configured; skipping route overlay");
            return None;
        }

        // Provider wants [lng, lat].
        let coordinates: Vec<[f64; 2]> = waypoints.iter().map(|&(lat, lng)| [lng, lat]).collect();

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.key)
            .json(&json!({ "coordinates": coordinates }))
            .send()
            .await;

        let parsed: RouteResponse = match response {
            Ok(res) => match res.error_for_status() {
                Ok(res) => match res.json().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("Malformed routing response: {}", e);
                        return None;
                    }
                },
                Err(e) => {
                    warn!("Routing provider rejected the request: {}", e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Routing request failed: {}", e);
                return None;
            }
        };

        let feature = match parsed.features.into_iter().next() {
            Some(feature) => feature,
            None => {
                debug!("Routing provider returned no features");
                return None;
            }
        };

        // Back to the internal (lat, lng) convention.
        let path: Vec<Coordinates> = feature
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| (lat, lng))
            .collect();

        if path.len() < 2 {
            warn!("Routing provider returned a degenerate geometry");
            return None;
        }
        Some(path)
    }
}
