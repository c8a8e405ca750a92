//! Event types and the main event loop driver.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, feed
//! updates from the backend poller, and pipeline progress/results) and the
//! [`EventHandler`], which runs a background task that polls crossterm for
//! key events and emits periodic [`Event::Tick`]s. The main loop in
//! `main.rs` receives events via [`EventHandler::next`]; other tasks (the
//! feed poller, pipeline runs) send events via [`EventHandler::tx`].

use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tokio::sync::mpsc;

use crate::models::TrackingPayload;
use crate::pipeline::{PathState, PipelinePhase};

/// Events processed by the application event loop.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used for UI refresh and spinner animation.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// Result of one backend poll: the payload on success, `None` on a
    /// failed fetch. Telemetry fields feed the status panel either way.
    FeedUpdate {
        payload: Option<TrackingPayload>,
        /// When this update was produced.
        timestamp: Instant,
        /// Whether the backend request succeeded.
        is_success: bool,
    },
    /// A pipeline run moved to a new phase (geocoding finished, route
    /// request in flight). Dropped by the app if `generation` is stale.
    PathProgress {
        generation: u64,
        phase: PipelinePhase,
    },
    /// Final output of a pipeline run. Dropped by the app if `generation`
    /// is stale.
    PathResolved { generation: u64, state: PathState },
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to other tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop. A background task polls
/// crossterm with a timeout and sends [`Event::Input`] on key press and
/// [`Event::Tick`] at the configured interval.
pub struct EventHandler {
    /// Sender for posting events (e.g. from the feed poller or a pipeline run).
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The spawned task runs until the process exits. It polls crossterm
    /// with a timeout of `tick_rate_ms`; when a key is pressed it sends
    /// [`Event::Input`], and when the tick interval elapses it sends
    /// [`Event::Tick`].
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                if event::poll(timeout).expect("Poll failed") {
                    if let CrosstermEvent::Key(key) = event::read().expect("Read failed") {
                        event_tx.send(Event::Input(key)).ok();
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    event_tx.send(Event::Tick).ok();
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` when all senders have been dropped (e.g. the input
    /// task exited).
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
