//! TUI rendering for the Courier TUI
//!
//! This module handles all UI rendering logic using the `ratatui` crate:
//! the delivery map (canvas with route overlay), the checkpoint timeline,
//! and the settings view. Rendering is pure: everything drawn comes from
//! [`App`] state committed by the main loop.

use crate::app::{App, ViewMode};
use crate::pipeline::{PathState, PipelinePhase};
use ratatui::{
    prelude::*,
    widgets::canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
    widgets::*,
};

use ratatui::text::Line;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Renders one frame of the TUI based on current application state.
///
/// Selects the view from [`App::view_mode`]: map (canvas + checkpoint
/// sidebar), timeline (list + detail + telemetry), or settings.
pub fn render(f: &mut Frame, app: &App) {
    match app.view_mode {
        ViewMode::Map => render_map_view(f, app),
        ViewMode::Timeline => render_timeline_view(f, app),
        ViewMode::Settings => render_settings_view(f, app),
    }
}

/// Map view: checkpoint sidebar (25%) + delivery map canvas (75%).
///
/// The canvas frames the padded bounding box of the resolved path, draws
/// landmass outlines, the route overlay (or straight checkpoint-to-checkpoint
/// segments when no route came back), every resolved checkpoint, and the
/// current location marker.
fn render_map_view(f: &mut Frame, app: &App) {
    let title = map_title(app);

    // Hidden means hidden: no sidebar, no canvas, whatever the pipeline is
    // doing underneath.
    let path = match app.visible_path() {
        Some(path) => path,
        None => {
            let hidden = Paragraph::new("Map hidden. Press 'h' to show it again.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::bordered().title(title));
            f.render_widget(hidden, f.size());
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(f.size());

    draw_checkpoint_sidebar(f, app, chunks[0]);

    match path.phase {
        PipelinePhase::Empty => {
            let empty = Paragraph::new("No tracking data for this shipment yet.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::bordered().title(title));
            f.render_widget(empty, chunks[1]);
        }
        PipelinePhase::Idle => {
            let idle = Paragraph::new("Waiting for the tracking feed...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::bordered().title(title));
            f.render_widget(idle, chunks[1]);
        }
        _ => draw_delivery_map(f, app, path, chunks[1], title),
    }
}

fn map_title(app: &App) -> String {
    let mut title = String::from(" Delivery Map ");
    if let Some(payload) = &app.payload {
        if !payload.destination.is_empty() {
            title = format!(" Delivery Map → {} ", payload.destination);
        }
    }
    if app.loading() {
        let frame = SPINNER[app.tick_count % SPINNER.len()];
        title.push_str(&format!("{} ", frame));
    }
    title
}

fn draw_delivery_map(f: &mut Frame, app: &App, path: &PathState, area: Rect, title: String) {
    // Frame the resolved path; fall back to the user's rough area when the
    // pipeline has produced nothing to look at yet.
    let (x_bounds, y_bounds) = match path.bounds {
        Some(bounds) => {
            let padded = bounds.padded(0.25);
            ([padded.min_lng, padded.max_lng], [padded.min_lat, padded.max_lat])
        }
        None => {
            let (lat, lng) = app.fallback_center;
            ([lng - 5.0, lng + 5.0], [lat - 5.0, lat + 5.0])
        }
    };

    let selected = app.selected_index;
    let canvas = Canvas::default()
        .block(Block::bordered().title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            // Landmass Outlines
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });

            // Route overlay when the provider gave us one, plain
            // checkpoint-to-checkpoint segments otherwise.
            if let Some(route) = &path.route_path {
                for pair in route.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].1,
                        y1: pair[0].0,
                        x2: pair[1].1,
                        y2: pair[1].0,
                        color: Color::Yellow,
                    });
                }
            } else {
                for pair in path.delivery_path.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].coordinates.1,
                        y1: pair[0].coordinates.0,
                        x2: pair[1].coordinates.1,
                        y2: pair[1].coordinates.0,
                        color: Color::DarkGray,
                    });
                }
            }

            // Checkpoints
            for (i, checkpoint) in path.delivery_path.iter().enumerate() {
                let (lat, lng) = checkpoint.coordinates;
                if i == selected {
                    ctx.print(
                        lng,
                        lat,
                        Line::from(vec![
                            Span::styled(
                                " ● ",
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!(" {} ", checkpoint.location),
                                Style::default().fg(Color::Black).bg(Color::Yellow),
                            ),
                        ]),
                    );
                } else {
                    ctx.print(lng, lat, "·");
                }
            }

            // Current location marker
            if let Some(current) = &path.current_location {
                let (lat, lng) = current.coordinates;
                ctx.print(
                    lng,
                    lat,
                    Line::from(Span::styled(
                        " ⌖ ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )),
                );
            }
        });

    f.render_widget(canvas, area);
}

fn draw_checkpoint_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .path
        .delivery_path
        .iter()
        .enumerate()
        .map(|(i, checkpoint)| {
            let style = if i == app.selected_index {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let place = if checkpoint.location.len() > 18 {
                &checkpoint.location[..18]
            } else {
                &checkpoint.location
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<18}", place), style),
                Span::styled(
                    format!(" │ {}", checkpoint.checkpoint_date),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Checkpoints ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(list, area);
}

/// Timeline view: checkpoint list sidebar (30%) + main area (70%).
///
/// The main area is split into a fixed-height feed telemetry block and a
/// details paragraph for the selected checkpoint.
fn render_timeline_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(f.size());

    draw_checkpoint_sidebar(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(chunks[1]);

    // Feed Telemetry Panel
    let now = std::time::Instant::now();
    let seconds_ago = app
        .last_update
        .map(|inst| now.duration_since(inst).as_secs())
        .unwrap_or(0);

    let freshness_color = if app.last_update_success && seconds_ago < 90 {
        Color::Green
    } else {
        Color::Red
    };

    let status = app
        .payload
        .as_ref()
        .map(|p| p.status.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown");
    let raw_count = app
        .payload
        .as_ref()
        .map(|p| p.origin_info.trackinfo.len())
        .unwrap_or(0);

    let telemetry = vec![
        Line::from(vec![
            Span::styled("Shipment:     ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(status),
        ]),
        Line::from(vec![
            Span::styled("Last poll:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("{}s ago", seconds_ago),
                Style::default().fg(freshness_color),
            ),
        ]),
        Line::from(vec![
            Span::styled("Resolved:     ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "{} of {} checkpoints",
                app.path.delivery_path.len(),
                raw_count
            )),
        ]),
        Line::from(vec![
            Span::styled("Route:        ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(if app.path.route_path.is_some() {
                "overlay available"
            } else {
                "no overlay"
            }),
        ]),
        Line::from(vec![
            Span::styled("Cached places:", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {}", app.geocode_cache_size)),
        ]),
    ];

    let telemetry_panel = Paragraph::new(telemetry).block(
        Block::default()
            .title(" Feed Telemetry ")
            .borders(Borders::ALL)
            .padding(Padding::new(2, 2, 1, 1)),
    );
    f.render_widget(telemetry_panel, main_chunks[0]);

    // Selected checkpoint details
    if let Some(checkpoint) = app.path.delivery_path.get(app.selected_index) {
        let raw = crate::models::Checkpoint {
            location: checkpoint.location.clone(),
            checkpoint_date: checkpoint.checkpoint_date.clone(),
        };
        let when = raw
            .parsed_date()
            .map(|dt| dt.format("%A %e %B, %H:%M").to_string())
            .unwrap_or_else(|| checkpoint.checkpoint_date.clone());

        let details = vec![
            Line::from(vec![
                Span::styled("Location:     ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(&checkpoint.location),
            ]),
            Line::from(vec![
                Span::styled("Scanned:      ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(when),
            ]),
            Line::from(vec![
                Span::styled("Coordinates:  ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    "{:.4}, {:.4}",
                    checkpoint.coordinates.0, checkpoint.coordinates.1
                )),
            ]),
        ];

        let p = Paragraph::new(details).block(
            Block::default()
                .title(" Checkpoint Details ")
                .borders(Borders::ALL)
                .padding(Padding::new(2, 2, 1, 1)),
        );
        f.render_widget(p, main_chunks[1]);
    } else {
        let placeholder = Paragraph::new("No resolved checkpoints to inspect.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(placeholder, main_chunks[1]);
    }
}

fn render_settings_view(f: &mut Frame, _app: &App) {
    let area = f.size();
    let help = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Key Bindings",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  q        quit"),
        Line::from("  Tab      cycle Map / Timeline / Settings"),
        Line::from("  h        hide or show the map"),
        Line::from("  j / k    select next / previous checkpoint (wraps)"),
        Line::from(""),
        Line::from(Span::styled(
            "  Providers are configured in config.toml.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let p = Paragraph::new(help).block(
        Block::default()
            .title(" Settings ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(p, area);
}
