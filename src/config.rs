use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub geocoder: GeocoderConfig,
    pub router: RouterConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,           // Shop backend serving the tracking feed
    pub order_id: String,           // Shipment to follow
    pub poll_interval_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub key: String, // Forward-geocoding API key
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RouterConfig {
    pub endpoint: String,
    pub key: String, // Directions API key; empty disables the route overlay
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UiConfig {
    pub default_view: String, // "Map" or "Timeline"
}

impl Config {
    /// Loads config.toml from the root directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        let config_path = "config.toml";

        if let Ok(content) = fs::read_to_string(config_path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to parse config.toml: {}. Using defaults.", e),
            }
        }

        // Default Configuration
        let default_config = Config {
            api: ApiConfig {
                base_url: "http://localhost:4000".to_string(),
                order_id: String::new(),
                poll_interval_seconds: 30,
            },
            geocoder: GeocoderConfig {
                endpoint: "https://api.opencagedata.com/geocode/v1/json".to_string(),
                key: String::new(),
            },
            router: RouterConfig {
                endpoint: "https://api.openrouteservice.org/v2/directions/driving-car/geojson"
                    .to_string(),
                key: String::new(),
            },
            ui: UiConfig {
                default_view: "Map".to_string(),
            },
        };

        // Save default config to disk for the user to edit later
        let toml_string = toml::to_string_pretty(&default_config).unwrap();
        if fs::write(config_path, toml_string).is_err() {
            warn!("Could not write default config.toml to disk.");
        }

        info!("Loaded default configuration.");
        default_config
    }
}
