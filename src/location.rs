//! Fallback map centering.
//!
//! This module provides a single public function, [`get_fallback_center`],
//! which returns coordinates used to center the map when there is no
//! resolved delivery path to frame (Idle or Empty pipeline states).
//! Location is determined via IP geolocation (IpApi) with a fallback to
//! default coordinates on failure.

use ipgeolocate::{Locator, Service};
use tracing::{error, info};

/// Resolves the user's approximate location via IP geolocation.
///
/// Uses the [IpApi](https://ip-api.com/) service to geolocate based on the
/// given IP address. On success, returns the reported latitude and
/// longitude; on network or service failure, logs an error and returns New
/// York coordinates so the map still has somewhere to look.
///
/// # Returns
///
/// A tuple `(latitude, longitude)` in decimal degrees (WGS84). For example,
/// New York is approximately `(40.7128, -74.0060)`.
///
/// # Panics
///
/// Does not panic. Parse failures for latitude/longitude from the response
/// fall back to the same New York default as on service error.
pub async fn get_fallback_center() -> (f64, f64) {
    // Using IpApi as the service, it's pretty reliable.
    match Locator::get("1.1.1.1", Service::IpApi).await {
        Ok(loc) => {
            let lat = loc.latitude.parse::<f64>().unwrap_or(40.7128);
            let lon = loc.longitude.parse::<f64>().unwrap_or(-74.0060);
            info!("Geolocation successful - ({}, {})", lat, lon);
            (lat, lon)
        }
        Err(e) => {
            // Use NYC as a default if lookup fails.
            error!(
                "Error using geolocation service: {}. Using New York as default area.",
                e
            );
            (40.7128, -74.0060)
        }
    }
}
