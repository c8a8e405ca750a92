use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Latitude/longitude in decimal degrees. Internal convention is always
/// (lat, lng); the routing wire format is the one place that differs.
pub type Coordinates = (f64, f64);

/// Tracking payload as served by the shop backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingPayload {
    pub origin_info: OriginInfo,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub destination: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginInfo {
    #[serde(default)]
    pub trackinfo: Vec<Checkpoint>,
}

/// One raw tracking event. Immutable once received; `location` may be empty
/// for carrier scans that carry no place description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub location: String,
    pub checkpoint_date: String,
}

impl Checkpoint {
    /// Parses the backend's `"YYYY-MM-DD HH:MM[:SS]"` date string.
    /// Returns `None` for anything else; display code falls back to the
    /// raw string.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.checkpoint_date, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.checkpoint_date, "%Y-%m-%d %H:%M"))
            .ok()
    }
}

/// A checkpoint that survived geocoding. Checkpoints that fail to resolve
/// are dropped, never kept as partial entries.
#[derive(Debug, Clone)]
pub struct ResolvedCheckpoint {
    pub location: String,
    pub checkpoint_date: String,
    pub coordinates: Coordinates,
}

/// Covering box over a set of resolved coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl MapBounds {
    pub fn from_coords(coords: &[Coordinates]) -> Option<Self> {
        let (&(first_lat, first_lng), rest) = coords.split_first()?;
        let mut bounds = MapBounds {
            min_lat: first_lat,
            max_lat: first_lat,
            min_lng: first_lng,
            max_lng: first_lng,
        };
        for &(lat, lng) in rest {
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lat = bounds.max_lat.max(lat);
            bounds.min_lng = bounds.min_lng.min(lng);
            bounds.max_lng = bounds.max_lng.max(lng);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Coordinates {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Expands the box by `factor` of its span on each side, enforcing a
    /// minimum span so a single-city box still makes a usable viewport.
    pub fn padded(&self, factor: f64) -> Self {
        const MIN_SPAN: f64 = 1.0;
        let lat_span = (self.max_lat - self.min_lat).max(MIN_SPAN);
        let lng_span = (self.max_lng - self.min_lng).max(MIN_SPAN);
        MapBounds {
            min_lat: self.min_lat - lat_span * factor,
            max_lat: self.max_lat + lat_span * factor,
            min_lng: self.min_lng - lng_span * factor,
            max_lng: self.max_lng + lng_span * factor,
        }
    }
}

// Wire shape of the geocoding provider response. Only the fields the
// resolver reads; everything else in the body is ignored.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    pub lat: f64,
    pub lng: f64,
}

// Wire shape of the routing provider response (GeoJSON directions).
// Coordinates arrive as [lng, lat] pairs.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
pub struct RouteFeature {
    pub geometry: RouteGeometry,
}

#[derive(Debug, Deserialize)]
pub struct RouteGeometry {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}
