mod app;
mod ui;

use anyhow::{Context, Result};
use app::{App, InputMode};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use gdp_map::config::{Args, Command};
use gdp_map::data::{self, Sources};
use gdp_map::dataset::{CountryMetric, DatasetBuilder, Indicator};
use gdp_map::{logging, Dataset};
use ratatui::DefaultTerminal;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command();
    logging::init(
        args.verbose,
        args.log_file.as_deref(),
        command == Command::View,
    )?;

    match command {
        Command::View => view(&args),
        Command::Summary => summary(&args),
        Command::Search { query } => search(&args, &query),
        Command::Export { output } => export(&args, output.as_deref()),
    }
}

/// Load all sources and build the dataset
fn build(args: &Args) -> Result<(Dataset, Sources)> {
    let window = args.window()?;
    let sources = data::load(&args.sources()).context("loading map data")?;
    let dataset = DatasetBuilder::new(window).build_from(&sources);
    Ok((dataset, sources))
}

fn view(args: &Args) -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, args);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, args: &Args) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);
    terminal.draw(|frame| ui::render(frame, &app))?;

    match build(args) {
        Ok((dataset, sources)) => {
            info!(features = dataset.features.len(), "dataset ready");
            app.loaded(dataset, &sources.boundaries);
        }
        Err(err) => {
            error!("{err:#}");
            app.failed(&err);
        }
    }

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => match app.mode {
                    InputMode::Map => handle_map_key(&mut app, key),
                    InputMode::Search => handle_search_key(&mut app, key),
                },
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // GDP / population
        KeyCode::Char('g') | KeyCode::Char('G') | KeyCode::Tab => app.toggle_indicator(),

        // Layer toggles
        KeyCode::Char('f') | KeyCode::Char('F') => app.map_renderer.toggle_fill(),
        KeyCode::Char('b') | KeyCode::Char('B') => app.map_renderer.toggle_borders(),
        KeyCode::Char('L') => app.map_renderer.toggle_labels(),

        KeyCode::Char('/') => app.open_search(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Up => app.move_highlight(-1),
        KeyCode::Down | KeyCode::Tab => app.move_highlight(1),
        KeyCode::Char(c) => app.type_char(c),
        _ => {}
    }
}

/// Handle mouse events for panning, zooming and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker and tooltip
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click selects, drag pans
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn summary(args: &Args) -> Result<()> {
    let (dataset, _) = build(args)?;
    let mut out = std::io::stdout().lock();

    writeln!(out, "features: {}", dataset.features.len())?;
    for indicator in [Indicator::Gdp, Indicator::Population] {
        let scale = dataset.scale(indicator);
        let (min, max) = scale.domain();
        let with_data = dataset
            .features
            .iter()
            .filter(|f| f.metric.value(indicator).is_some())
            .count();
        writeln!(
            out,
            "{}: {with_data} with data, buckets 10^{min}..10^{max}, {} bins",
            indicator.label(),
            scale.bins()
        )?;
        for (bucket, rgb) in scale.legend() {
            writeln!(out, "  {rgb}  10^{bucket}")?;
        }
    }

    let missing: Vec<&str> = dataset
        .without_data()
        .map(|f| f.metric.name.as_str())
        .collect();
    writeln!(out, "without data: {}", missing.len())?;
    for name in missing {
        writeln!(out, "  {name}")?;
    }
    Ok(())
}

fn search(args: &Args, query: &str) -> Result<()> {
    let (dataset, _) = build(args)?;
    let mut out = std::io::stdout().lock();
    write!(out, "{}", search_report(&dataset, query))?;
    Ok(())
}

/// Prefix hits, `*` on the exact match. An exact match beyond the
/// suggestion cap is listed after the hits.
fn search_report(dataset: &Dataset, query: &str) -> String {
    let line = |marker: &str, country: &CountryMetric| {
        format!(
            "{marker} {:<4} {:<32} {}\n",
            country.code,
            country.name,
            ui::format_value(country.gdp_usd, Indicator::Gdp)
        )
    };

    let exact = dataset.search.exact(query);
    let hits = dataset.search.prefix(query);
    if hits.is_empty() {
        return format!("no country name starts with {query:?}\n");
    }

    let mut report = String::new();
    for hit in &hits {
        let is_exact = exact.as_ref().is_some_and(|m| m.index == hit.index);
        report.push_str(&line(if is_exact { "*" } else { " " }, hit.country));
    }
    if let Some(m) = exact.filter(|m| hits.iter().all(|h| h.index != m.index)) {
        report.push_str("  ...\n");
        report.push_str(&line("*", m.country));
    }
    report
}

fn export(args: &Args, output: Option<&Path>) -> Result<()> {
    let (dataset, _) = build(args)?;
    let json = simd_json::serde::to_string_pretty(&dataset.features)
        .context("serializing features")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), features = dataset.features.len(), "exported");
        }
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
