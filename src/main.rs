use color_eyre::Result;
use courier_tui::{
    api::TrackingProvider,
    app::App,
    config::Config,
    events::{Event, EventHandler},
    location, logging,
    pipeline::Pipeline,
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    install_panic_hook();
    color_eyre::install()?;

    let config = Config::load();

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(&config);
    let mut events = EventHandler::new(150); // High tick rate for smooth spinner

    // Somewhere to point the map until a delivery path is resolved.
    app.fallback_center = location::get_fallback_center().await;

    // Background feed poller
    let api_tx = events.tx.clone();
    let provider = TrackingProvider::new(config.api.base_url.clone(), config.api.order_id.clone());
    let poll_interval = Duration::from_secs(config.api.poll_interval_seconds.max(1));
    tokio::spawn(async move {
        loop {
            match provider.fetch_tracking().await {
                Ok(payload) => {
                    let _ = api_tx.send(Event::FeedUpdate {
                        payload: Some(payload),
                        timestamp: Instant::now(),
                        is_success: true,
                    });
                }
                Err(e) => {
                    warn!("Tracking feed poll failed: {}", e);
                    let _ = api_tx.send(Event::FeedUpdate {
                        payload: None,
                        timestamp: Instant::now(),
                        is_success: false,
                    });
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    });

    let pipeline = Arc::new(Pipeline::new(&config));

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Tick => app.on_tick(),
                Event::Input(key) => app.handle_key(key),
                Event::FeedUpdate {
                    payload,
                    timestamp,
                    is_success,
                } => app.note_feed(payload, timestamp, is_success),
                Event::PathProgress { generation, phase } => {
                    app.commit_progress(generation, phase)
                }
                Event::PathResolved { generation, state } => {
                    app.commit_resolved(generation, state);
                    app.geocode_cache_size = pipeline.cache_len();
                }
            }
        }

        // A freshly accepted payload (or a map just un-hidden) starts one
        // pipeline run, tagged with its generation.
        if let Some((payload, generation)) = app.take_pending_run() {
            let pipeline = Arc::clone(&pipeline);
            let tx = events.tx.clone();
            tokio::spawn(async move {
                pipeline.assemble(payload, generation, tx).await;
            });
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )
        .ok();
        original_hook(panic_info);
    }));
}
