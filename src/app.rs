use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::config::Config;
use crate::models::TrackingPayload;
use crate::pipeline::{PathState, PipelinePhase};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ViewMode {
    Map,
    Timeline,
    Settings,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Map
    }
}

pub struct App {
    pub view_mode: ViewMode,
    /// When false the map renders nothing, but in-flight pipeline work is
    /// allowed to finish and commit; it just isn't drawn.
    pub map_visible: bool,
    pub should_quit: bool,
    pub tick_count: usize,

    /// Latest raw payload from the feed; kept for the timeline view and for
    /// starting a deferred pipeline run when the map becomes visible again.
    pub payload: Option<TrackingPayload>,
    /// Committed pipeline output.
    pub path: PathState,
    /// Bumped once per accepted payload; commits carrying an older value
    /// are discarded as superseded.
    pub generation: u64,
    run_pending: bool,

    /// Map center when there is no resolved path to frame.
    pub fallback_center: (f64, f64),
    /// Timeline selection into `path.delivery_path`.
    pub selected_index: usize,

    // Feed telemetry
    pub last_update: Option<Instant>,
    pub last_update_success: bool,
    pub geocode_cache_size: usize,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let view_mode = match config.ui.default_view.to_lowercase().as_str() {
            "timeline" => ViewMode::Timeline,
            "settings" => ViewMode::Settings,
            _ => ViewMode::Map,
        };

        Self {
            view_mode,
            map_visible: true,
            should_quit: false,
            tick_count: 0,
            payload: None,
            path: PathState::default(),
            generation: 0,
            run_pending: false,
            fallback_center: (40.7128, -74.0060),
            selected_index: 0,
            last_update: None,
            last_update_success: false,
            geocode_cache_size: 0,
        }
    }

    /// Records the outcome of one backend poll.
    ///
    /// A successful poll with a payload supersedes whatever run is in
    /// flight: the generation advances and a new pipeline run becomes
    /// pending. A failed poll only updates telemetry.
    pub fn note_feed(&mut self, payload: Option<TrackingPayload>, timestamp: Instant, is_success: bool) {
        self.last_update = Some(timestamp);
        self.last_update_success = is_success;

        if let Some(payload) = payload {
            self.generation += 1;
            self.payload = Some(payload);
            self.run_pending = true;
        }
    }

    /// Hands out the next pipeline run, if one should start now.
    ///
    /// Returns the payload and its generation when a run is pending and the
    /// map is visible; a payload accepted while hidden stays pending until
    /// the map is shown again.
    pub fn take_pending_run(&mut self) -> Option<(TrackingPayload, u64)> {
        if !self.run_pending || !self.map_visible {
            return None;
        }
        let payload = self.payload.clone()?;
        self.run_pending = false;
        self.path.phase = PipelinePhase::Resolving;
        Some((payload, self.generation))
    }

    /// Applies a mid-run phase change, unless it is from a superseded run.
    pub fn commit_progress(&mut self, generation: u64, phase: PipelinePhase) {
        if generation != self.generation {
            debug!(
                "Discarding stale pipeline progress (gen {}, now {})",
                generation, self.generation
            );
            return;
        }
        self.path.phase = phase;
    }

    /// Commits a finished pipeline run, unless it is from a superseded run.
    pub fn commit_resolved(&mut self, generation: u64, state: PathState) {
        if generation != self.generation {
            debug!(
                "Discarding superseded pipeline result (gen {}, now {})",
                generation, self.generation
            );
            return;
        }
        self.selected_index = self
            .selected_index
            .min(state.delivery_path.len().saturating_sub(1));
        self.path = state;
    }

    /// The path to draw, or `None` while the map is hidden.
    pub fn visible_path(&self) -> Option<&PathState> {
        self.map_visible.then_some(&self.path)
    }

    pub fn loading(&self) -> bool {
        self.path.loading()
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.view_mode = match self.view_mode {
                    ViewMode::Map => ViewMode::Timeline,
                    ViewMode::Timeline => ViewMode::Settings,
                    ViewMode::Settings => ViewMode::Map,
                };
            }
            KeyCode::Char('h') => self.map_visible = !self.map_visible,
            // Selection wraps at both ends of the checkpoint list.
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.path.delivery_path.len();
                if len > 0 {
                    self.selected_index = (self.selected_index + 1) % len;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.path.delivery_path.len();
                if len > 0 {
                    self.selected_index = self
                        .selected_index
                        .checked_sub(1)
                        .unwrap_or(len - 1);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, GeocoderConfig, RouterConfig, UiConfig};
    use crate::models::{Checkpoint, OriginInfo, ResolvedCheckpoint};
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:4000".into(),
                order_id: "ORD-1".into(),
                poll_interval_seconds: 30,
            },
            geocoder: GeocoderConfig {
                endpoint: "http://localhost:0".into(),
                key: String::new(),
            },
            router: RouterConfig {
                endpoint: "http://localhost:0".into(),
                key: String::new(),
            },
            ui: UiConfig {
                default_view: "Map".into(),
            },
        }
    }

    fn payload(locations: &[&str]) -> TrackingPayload {
        TrackingPayload {
            origin_info: OriginInfo {
                trackinfo: locations
                    .iter()
                    .map(|loc| Checkpoint {
                        location: loc.to_string(),
                        checkpoint_date: "2026-07-01 08:19".into(),
                    })
                    .collect(),
            },
            status: "InTransit".into(),
            destination: "Boston, MA".into(),
        }
    }

    fn resolved(location: &str, coordinates: (f64, f64)) -> ResolvedCheckpoint {
        ResolvedCheckpoint {
            location: location.to_string(),
            checkpoint_date: "2026-07-01 08:19".into(),
            coordinates,
        }
    }

    fn ready_state(checkpoints: Vec<ResolvedCheckpoint>) -> PathState {
        PathState {
            phase: PipelinePhase::Ready,
            current_location: checkpoints.last().cloned(),
            delivery_path: checkpoints,
            bounds: None,
            route_path: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn new_payload_supersedes_the_previous_run() {
        let mut app = App::new(&test_config());

        app.note_feed(Some(payload(&["New York, NY"])), Instant::now(), true);
        let (_, gen_a) = app.take_pending_run().unwrap();

        // Payload B arrives before A's results do.
        app.note_feed(Some(payload(&["Chicago, IL"])), Instant::now(), true);
        let (_, gen_b) = app.take_pending_run().unwrap();
        assert!(gen_b > gen_a);

        // A's late result must be dropped, B's committed.
        app.commit_resolved(gen_a, ready_state(vec![resolved("New York, NY", (40.7128, -74.0060))]));
        assert!(app.path.delivery_path.is_empty());

        app.commit_resolved(gen_b, ready_state(vec![resolved("Chicago, IL", (41.8781, -87.6298))]));
        assert_eq!(app.path.delivery_path.len(), 1);
        assert_eq!(app.path.delivery_path[0].location, "Chicago, IL");
    }

    #[test]
    fn stale_progress_is_discarded() {
        let mut app = App::new(&test_config());
        app.note_feed(Some(payload(&["New York, NY"])), Instant::now(), true);
        let (_, gen_a) = app.take_pending_run().unwrap();
        app.note_feed(Some(payload(&["Chicago, IL"])), Instant::now(), true);
        app.take_pending_run().unwrap();

        app.commit_progress(gen_a, PipelinePhase::RoutingInFlight);
        assert_eq!(app.path.phase, PipelinePhase::Resolving);
    }

    #[test]
    fn hidden_map_defers_pipeline_runs() {
        let mut app = App::new(&test_config());
        app.map_visible = false;

        app.note_feed(Some(payload(&["New York, NY"])), Instant::now(), true);
        assert!(app.take_pending_run().is_none());

        // Showing the map releases the deferred run with its generation.
        app.handle_key(key(KeyCode::Char('h')));
        let (_, generation) = app.take_pending_run().unwrap();
        assert_eq!(generation, app.generation);
    }

    #[test]
    fn hidden_map_still_commits_but_renders_nothing() {
        let mut app = App::new(&test_config());
        app.note_feed(Some(payload(&["New York, NY"])), Instant::now(), true);
        let (_, generation) = app.take_pending_run().unwrap();

        app.handle_key(key(KeyCode::Char('h')));
        app.commit_resolved(generation, ready_state(vec![resolved("New York, NY", (40.7128, -74.0060))]));

        assert!(app.visible_path().is_none());
        assert_eq!(app.path.delivery_path.len(), 1);

        app.handle_key(key(KeyCode::Char('h')));
        assert!(app.visible_path().is_some());
    }

    #[test]
    fn failed_poll_updates_telemetry_without_superseding() {
        let mut app = App::new(&test_config());
        app.note_feed(Some(payload(&["New York, NY"])), Instant::now(), true);
        let generation = app.generation;

        app.note_feed(None, Instant::now(), false);
        assert_eq!(app.generation, generation);
        assert!(!app.last_update_success);
        assert!(app.last_update.is_some());
    }

    #[test]
    fn selection_wraps_at_both_ends() {
        let mut app = App::new(&test_config());
        app.note_feed(Some(payload(&["a", "b", "c"])), Instant::now(), true);
        let (_, generation) = app.take_pending_run().unwrap();
        app.commit_resolved(
            generation,
            ready_state(vec![
                resolved("a", (1.0, 1.0)),
                resolved("b", (2.0, 2.0)),
                resolved("c", (3.0, 3.0)),
            ]),
        );

        assert_eq!(app.selected_index, 0);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected_index, 2);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn selection_is_clamped_when_the_path_shrinks() {
        let mut app = App::new(&test_config());
        app.note_feed(Some(payload(&["a", "b", "c"])), Instant::now(), true);
        let (_, generation) = app.take_pending_run().unwrap();
        app.commit_resolved(
            generation,
            ready_state(vec![
                resolved("a", (1.0, 1.0)),
                resolved("b", (2.0, 2.0)),
                resolved("c", (3.0, 3.0)),
            ]),
        );
        app.selected_index = 2;

        app.note_feed(Some(payload(&["a"])), Instant::now(), true);
        let (_, generation) = app.take_pending_run().unwrap();
        app.commit_resolved(generation, ready_state(vec![resolved("a", (1.0, 1.0))]));

        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn loading_tracks_pipeline_phases() {
        let mut app = App::new(&test_config());
        assert!(!app.loading());

        app.note_feed(Some(payload(&["New York, NY"])), Instant::now(), true);
        let (_, generation) = app.take_pending_run().unwrap();
        assert!(app.loading());

        app.commit_progress(generation, PipelinePhase::RoutingInFlight);
        assert!(app.loading());

        app.commit_resolved(generation, ready_state(vec![resolved("New York, NY", (40.7128, -74.0060))]));
        assert!(!app.loading());
    }
}
