//! Location resolution and route assembly.
//!
//! One [`Pipeline::assemble`] run turns a raw tracking payload into a
//! [`PathState`]: every checkpoint is geocoded concurrently, the survivors
//! are reassembled in their original order, and a driving-route overlay is
//! requested once geocoding is done. Results flow back to the main loop as
//! events tagged with the generation the run was started for; the app
//! discards anything stale, so a superseded run can finish in peace without
//! clobbering newer state.

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::config::Config;
use crate::events::Event;
use crate::geocode::Geocoder;
use crate::models::{Coordinates, MapBounds, ResolvedCheckpoint, TrackingPayload};
use crate::route::RoutePlanner;

/// Orchestrator state for one tracking payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    /// No payload accepted yet, or the map is hidden.
    #[default]
    Idle,
    /// Checkpoints are being geocoded.
    Resolving,
    /// Geocoding done, route overlay request pending.
    RoutingInFlight,
    /// Final state for this payload; the route may or may not be present.
    Ready,
    /// The payload had no checkpoints, or none of them resolved.
    Empty,
}

/// Displayable aggregate derived from one tracking payload.
#[derive(Debug, Clone, Default)]
pub struct PathState {
    pub phase: PipelinePhase,
    /// Resolved checkpoints in original payload order. Always no longer
    /// than the input checkpoint list: failures drop out, never null-pad.
    pub delivery_path: Vec<ResolvedCheckpoint>,
    /// Last element of `delivery_path`, when non-empty.
    pub current_location: Option<ResolvedCheckpoint>,
    pub bounds: Option<MapBounds>,
    /// Road path from the routing provider; at least 2 points when present.
    pub route_path: Option<Vec<Coordinates>>,
}

impl PathState {
    fn empty() -> Self {
        PathState {
            phase: PipelinePhase::Empty,
            ..Default::default()
        }
    }

    /// True while a pipeline run for the current payload is still working.
    pub fn loading(&self) -> bool {
        matches!(
            self.phase,
            PipelinePhase::Resolving | PipelinePhase::RoutingInFlight
        )
    }
}

pub struct Pipeline {
    geocoder: Geocoder,
    planner: RoutePlanner,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            geocoder: Geocoder::new(
                config.geocoder.endpoint.clone(),
                config.geocoder.key.clone(),
            ),
            planner: RoutePlanner::new(config.router.endpoint.clone(), config.router.key.clone()),
        }
    }

    /// Builds a `Pipeline` directly from provider parts. Test seam.
    pub fn from_parts(geocoder: Geocoder, planner: RoutePlanner) -> Self {
        Self { geocoder, planner }
    }

    /// Runs the full pipeline for one payload and reports back over `events`.
    ///
    /// Emits [`Event::PathProgress`] when resolution finishes and the route
    /// request starts, then [`Event::PathResolved`] with the final state.
    /// Both carry `generation` so the receiver can drop superseded results.
    /// Provider failures never escape this function; they only shrink the
    /// output.
    pub async fn assemble(
        &self,
        payload: TrackingPayload,
        generation: u64,
        events: UnboundedSender<Event>,
    ) {
        let checkpoints = &payload.origin_info.trackinfo;
        if checkpoints.is_empty() {
            debug!("Payload has no checkpoints; nothing to resolve");
            let _ = events.send(Event::PathResolved {
                generation,
                state: PathState::empty(),
            });
            return;
        }

        // All lookups in flight at once; join_all keeps results in input
        // order regardless of completion order.
        let lookups = checkpoints
            .iter()
            .map(|checkpoint| self.geocoder.resolve(&checkpoint.location));
        let resolutions = join_all(lookups).await;

        let delivery_path: Vec<ResolvedCheckpoint> = checkpoints
            .iter()
            .zip(resolutions)
            .filter_map(|(checkpoint, coordinates)| {
                coordinates.map(|coordinates| ResolvedCheckpoint {
                    location: checkpoint.location.clone(),
                    checkpoint_date: checkpoint.checkpoint_date.clone(),
                    coordinates,
                })
            })
            .collect();

        if delivery_path.is_empty() {
            info!(
                "None of the {} checkpoints could be geocoded",
                checkpoints.len()
            );
            let _ = events.send(Event::PathResolved {
                generation,
                state: PathState::empty(),
            });
            return;
        }

        let _ = events.send(Event::PathProgress {
            generation,
            phase: PipelinePhase::RoutingInFlight,
        });

        let waypoints: Vec<Coordinates> = delivery_path
            .iter()
            .map(|checkpoint| checkpoint.coordinates)
            .collect();

        // Strictly after geocoding: the request needs the full waypoint list.
        let route_path = self.planner.fetch_route(&waypoints).await;

        let state = PathState {
            phase: PipelinePhase::Ready,
            current_location: delivery_path.last().cloned(),
            bounds: MapBounds::from_coords(&waypoints),
            delivery_path,
            route_path,
        };

        info!(
            "Assembled path: {}/{} checkpoints resolved, route overlay: {}",
            state.delivery_path.len(),
            checkpoints.len(),
            state.route_path.is_some()
        );
        let _ = events.send(Event::PathResolved { generation, state });
    }

    /// Current geocode cache population, for the telemetry panel.
    pub fn cache_len(&self) -> usize {
        self.geocoder.cached_len()
    }
}
