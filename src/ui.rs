use crate::app::{App, InputMode, Screen, SIDE_PANEL_WIDTH};
use gdp_map::braille::BrailleCanvas;
use gdp_map::dataset::{Indicator, Rgb, MAX_SUGGESTIONS};
use gdp_map::map::{Choropleth, MapLayers};
use gdp_map::Session;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset as Series, GraphType, List, ListItem, Paragraph,
        Widget, Wrap,
    },
    Frame,
};

/// Human-readable figure: `$2.78T` for GDP, `66.99M` for population
pub fn format_value(value: Option<f64>, indicator: Indicator) -> String {
    let Some(v) = value else {
        return "no data".to_string();
    };
    let (scaled, suffix) = match v.abs() {
        a if a >= 1e12 => (v / 1e12, "T"),
        a if a >= 1e9 => (v / 1e9, "B"),
        a if a >= 1e6 => (v / 1e6, "M"),
        a if a >= 1e3 => (v / 1e3, "K"),
        _ => (v, ""),
    };
    match indicator {
        Indicator::Gdp => format!("${scaled:.2}{suffix}"),
        Indicator::Population => format!("{scaled:.2}{suffix}"),
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn braille_char(bits: u8) -> char {
    char::from_u32(0x2800 + bits as u32).unwrap_or(' ')
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into main area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map + side panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    match &app.screen {
        Screen::Loading => render_message(
            frame,
            chunks[0],
            " Loading ",
            "Fetching boundaries and economic tables…",
            Color::Cyan,
        ),
        Screen::Failed(message) => render_message(
            frame,
            chunks[0],
            " Failed to load data ",
            &format!("{message}\n\nPress q to quit."),
            Color::Red,
        ),
        Screen::Ready(session) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Min(10),
                    Constraint::Length(SIDE_PANEL_WIDTH as u16),
                ])
                .split(chunks[0]);
            render_map(frame, app, session, columns[0]);
            render_side_panel(frame, app, session, columns[1]);
        }
    }

    render_status_bar(frame, app, chunks[1]);
}

fn render_message(frame: &mut Frame, area: Rect, title: &str, text: &str, accent: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    let paragraph = Paragraph::new(text.to_string())
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_map(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let indicator = session.indicator();
    let dataset = session.dataset();

    // Tooltip for the hovered country
    let tooltip = app
        .hovered
        .and_then(|i| dataset.features.get(i))
        .map(|f| {
            format!(
                " {} · {} {} ",
                f.metric.name,
                indicator.label(),
                format_value(f.metric.value(indicator), indicator)
            )
        })
        .unwrap_or_default();

    // Create a block with border
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" World {} ", indicator.label()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(tooltip, Style::default().fg(Color::White)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Update viewport size for rendering
    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let scale = dataset.scale(indicator);
    let bins = dataset.bins(indicator);
    let selected = session.selected_index();
    let label = selected
        .and_then(|i| dataset.features.get(i))
        .map(|f| f.metric.name.as_str());

    let layers = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        &Choropleth {
            bins: &bins,
            bin_count: scale.bins(),
            highlight: selected.or(app.hovered),
            label: selected.zip(label),
        },
    );

    // Get mouse cursor position for marker
    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        // Convert braille pixels to character position
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    let map_widget = MapWidget {
        layers,
        palette: scale.palette().iter().copied().map(color).collect(),
        cursor_pos,
    };
    frame.render_widget(map_widget, inner);
}

/// Custom widget that renders the braille choropleth with labels overlaid
struct MapWidget {
    layers: MapLayers,
    palette: Vec<Color>,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Visit every non-blank cell of a canvas that falls inside `area`
    fn for_each_cell(canvas: &BrailleCanvas, area: Rect, mut f: impl FnMut(u16, u16, u8)) {
        for row in 0..area.height {
            for col in 0..area.width {
                let bits = canvas.cell(col as usize, row as usize);
                if bits != 0 {
                    f(col, row, bits);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width as usize;
        let mut fill_at: Vec<Option<Color>> = vec![None; width * area.height as usize];

        // 1. Fills, one palette bin at a time (lightest first)
        for (bin, canvas) in self.layers.fills.iter().enumerate() {
            let fg = self.palette.get(bin).copied().unwrap_or(Color::Gray);
            Self::for_each_cell(canvas, area, |col, row, bits| {
                buf[(area.x + col, area.y + row)]
                    .set_char(braille_char(bits))
                    .set_fg(fg);
                fill_at[row as usize * width + col as usize] = Some(fg);
            });
        }

        // 2. Borders: dark dots over the fill color, gray on empty cells
        Self::for_each_cell(&self.layers.borders, area, |col, row, bits| {
            let cell = &mut buf[(area.x + col, area.y + row)];
            cell.set_char(braille_char(bits));
            match fill_at[row as usize * width + col as usize] {
                Some(bg) => {
                    cell.set_fg(Color::Black).set_bg(bg);
                }
                None => {
                    cell.set_fg(Color::DarkGray);
                }
            }
        });

        // 3. Highlighted outline (on top)
        Self::for_each_cell(&self.layers.highlight, area, |col, row, bits| {
            buf[(area.x + col, area.y + row)]
                .set_char(braille_char(bits))
                .set_fg(Color::Yellow);
        });

        // Then overlay labels
        let label_style = Style::default()
            .fg(Color::White)
            .bg(Color::Black)
            .add_modifier(Modifier::BOLD);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let max_len = (area.width - *lx) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + *lx + i as u16, area.y + *ly)]
                    .set_char(ch)
                    .set_style(label_style);
            }
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_side_panel(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let scale = session.dataset().scale(session.indicator());
    let legend_height = (scale.bins() as u16 + 2).min(12);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                          // Search input
            Constraint::Length(MAX_SUGGESTIONS as u16 + 2), // Suggestions
            Constraint::Length(legend_height),              // Legend
            Constraint::Min(6),                             // Details
        ])
        .split(area);

    render_search(frame, app, chunks[0], chunks[1]);
    render_legend(frame, session, chunks[2]);
    render_details(frame, session, chunks[3]);
}

fn render_search(frame: &mut Frame, app: &App, input_area: Rect, list_area: Rect) {
    let active = app.mode == InputMode::Search;
    let accent = if active { Color::Yellow } else { Color::DarkGray };

    let mut spans = vec![Span::raw(app.search.query.clone())];
    if active {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .title(" Search [/] "),
    );
    frame.render_widget(input, input_area);

    let suggestions = app.suggestions();
    let items: Vec<ListItem> = if suggestions.is_empty() && !app.search.query.is_empty() {
        vec![ListItem::new(Span::styled(
            "no matches",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        suggestions
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let style = if active && i == app.search.highlighted {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Span::styled(m.country.name.clone(), style))
            })
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(list, list_area);
}

fn render_legend(frame: &mut Frame, session: &Session, area: Rect) {
    let indicator = session.indicator();
    let scale = session.dataset().scale(indicator);

    // Darkest (largest) first
    let lines: Vec<Line> = scale
        .legend()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|(bucket, rgb)| {
            Line::from(vec![
                Span::styled("██ ", Style::default().fg(color(rgb))),
                Span::raw(format!("10^{bucket}")),
            ])
        })
        .collect();

    let legend = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Legend · {} ", indicator.label())),
    );
    frame.render_widget(legend, area);
}

fn render_details(frame: &mut Frame, session: &Session, area: Rect) {
    let indicator = session.indicator();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Details ");

    let Some(feature) = session.selected() else {
        let hint = Paragraph::new("Click a country or search\nfor one to see its history.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };
    let metric = &feature.metric;

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(inner);

    let dim = Style::default().fg(Color::DarkGray);
    let flag = metric.flag_code.as_deref().unwrap_or("--");
    let bucket = metric
        .magnitude(indicator)
        .map(|b| format!("10^{b}"))
        .unwrap_or_else(|| "n/a".to_string());
    let info = Paragraph::new(vec![
        Line::from(Span::styled(
            metric.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Code ", dim),
            Span::raw(format!("{} / {}", metric.code, flag)),
        ]),
        Line::from(vec![
            Span::styled("GDP ", dim),
            Span::raw(format_value(metric.gdp_usd, Indicator::Gdp)),
        ]),
        Line::from(vec![
            Span::styled("Population ", dim),
            Span::raw(format_value(metric.population_count, Indicator::Population)),
        ]),
        Line::from(vec![Span::styled("Magnitude ", dim), Span::raw(bucket)]),
    ]);
    frame.render_widget(info, chunks[0]);

    render_history(frame, session, chunks[1]);
}

fn render_history(frame: &mut Frame, session: &Session, area: Rect) {
    let indicator = session.indicator();
    let Some(feature) = session.selected() else {
        return;
    };
    let history = feature.metric.history(indicator);
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return;
    };

    let points: Vec<(f64, f64)> = history
        .iter()
        .map(|p| (p.year as f64, p.value))
        .collect();
    let peak = points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    let top = if peak > 0.0 { peak * 1.1 } else { 1.0 };

    let series = vec![Series::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(match indicator {
            Indicator::Gdp => Color::LightBlue,
            Indicator::Population => Color::LightRed,
        }))
        .data(&points)];

    let chart = Chart::new(series)
        .block(Block::default().title(format!(" {} history ", indicator.label())))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([first.year as f64, (last.year as f64).max(first.year as f64 + 1.0)])
                .labels(vec![first.year.to_string(), last.year.to_string()]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, top])
                .labels(vec![
                    "0".to_string(),
                    format_value(Some(top), indicator),
                ]),
        );
    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    let indicator = app.session().map(|s| s.indicator());

    let toggle = |on: bool, on_text: &'static str, off_text: &'static str| {
        Span::styled(
            if on { on_text } else { off_text },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        // Layer indicator
        toggle(indicator == Some(Indicator::Gdp), "[G]DP ", "[g]dp "),
        toggle(
            indicator == Some(Indicator::Population),
            "[G]Pop ",
            "[g]pop ",
        ),
        // Toggle indicators
        toggle(settings.show_fill, "[F]ill ", "[f]ill "),
        toggle(settings.show_borders, "[B]order ", "[b]order "),
        toggle(settings.show_labels, "[L]abels ", "[l]abels "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | /:search hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
