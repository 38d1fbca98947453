use gdp_map::data::BoundaryFeature;
use gdp_map::dataset::{Dataset, Match};
use gdp_map::map::{MapRenderer, Viewport};
use gdp_map::{Session, SessionEvent};

/// Columns reserved right of the map for search, legend and details
pub const SIDE_PANEL_WIDTH: usize = 38;

/// Braille pixel size of the map for a terminal of `width` x `height` cells
fn map_pixels(width: usize, height: usize) -> (usize, usize) {
    // Account for border (2 chars horizontal, 2 chars vertical) and status bar
    let inner_width = width.saturating_sub(SIDE_PANEL_WIDTH + 2);
    let inner_height = height.saturating_sub(3);
    // Braille gives 2x4 resolution per character
    (inner_width * 2, inner_height * 4)
}

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Map,
    Search,
}

/// Search box text plus the highlighted suggestion
#[derive(Default)]
pub struct SearchBox {
    pub query: String,
    pub highlighted: usize,
}

/// What the viewer is showing
pub enum Screen {
    Loading,
    Failed(String),
    Ready(Session),
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub screen: Screen,
    pub mode: InputMode,
    pub search: SearchBox,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current left-button press has moved (drag, not click)
    dragged: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Feature under the mouse
    pub hovered: Option<usize>,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = map_pixels(width, height);

        Self {
            viewport: Viewport::world(pixel_width, pixel_height),
            map_renderer: MapRenderer::new(),
            screen: Screen::Loading,
            mode: InputMode::Map,
            search: SearchBox::default(),
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            hovered: None,
        }
    }

    /// Install the built dataset
    pub fn loaded(&mut self, dataset: Dataset, boundaries: &[BoundaryFeature]) {
        self.map_renderer = MapRenderer::from_boundaries(boundaries);
        self.screen = Screen::Ready(Session::new(dataset));
    }

    /// Show a failure panel instead of the map
    pub fn failed(&mut self, error: &anyhow::Error) {
        self.screen = Screen::Failed(format!("{error:#}"));
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.screen {
            Screen::Ready(session) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.screen {
            Screen::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = map_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom in
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    /// Zoom out
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Back to the whole world
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
        if let Some(session) = self.session_mut() {
            session.clear_selection();
        }
        self.process_events();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Scale based on zoom: less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((x, y));
    }

    /// Button released: a press without drag is a click on the country
    /// under the pointer
    pub fn release(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            if let Some(index) = self.country_at(col, row) {
                self.select(index);
            }
        }
    }

    /// Update mouse cursor position and the hovered country
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.hovered = self.country_at(col, row);
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| to_pixel(col, row))
    }

    fn country_at(&self, col: u16, row: u16) -> Option<usize> {
        self.session()?;
        let (px, py) = to_pixel(col, row);
        if px < 0 || py < 0 || px >= self.viewport.width as i32 || py >= self.viewport.height as i32 {
            return None;
        }
        let (lon, lat) = self.viewport.unproject(px, py);
        self.map_renderer.feature_at(lon, lat)
    }

    pub fn select(&mut self, index: usize) {
        if let Some(session) = self.session_mut() {
            session.select(index);
        }
        self.process_events();
    }

    pub fn toggle_indicator(&mut self) {
        if let Some(session) = self.session_mut() {
            session.toggle_indicator();
        }
        self.process_events();
    }

    /// Apply queued session events to the view
    pub fn process_events(&mut self) {
        let events = match self.session_mut() {
            Some(session) => session.drain_events(),
            None => return,
        };
        for event in events {
            match event {
                SessionEvent::Focus { bounds, .. } => self.viewport.fit_bounds(&bounds),
                SessionEvent::IndicatorChanged(_) | SessionEvent::SelectionCleared => {}
            }
        }
    }

    // --- search box ---

    pub fn open_search(&mut self) {
        self.mode = InputMode::Search;
    }

    pub fn close_search(&mut self) {
        self.mode = InputMode::Map;
    }

    pub fn suggestions(&self) -> Vec<Match<'_>> {
        self.session()
            .map(|s| s.suggestions(&self.search.query))
            .unwrap_or_default()
    }

    pub fn type_char(&mut self, c: char) {
        self.search.query.push(c);
        self.search.highlighted = 0;
    }

    pub fn backspace(&mut self) {
        self.search.query.pop();
        self.search.highlighted = 0;
    }

    pub fn move_highlight(&mut self, delta: i32) {
        let count = self.suggestions().len();
        if count == 0 {
            return;
        }
        let next = (self.search.highlighted as i32 + delta).rem_euclid(count as i32);
        self.search.highlighted = next as usize;
    }

    /// Enter: an exact name match wins, otherwise the highlighted suggestion
    pub fn submit_search(&mut self) {
        let query = self.search.query.clone();
        let fallback = self
            .suggestions()
            .get(self.search.highlighted)
            .map(|m| m.index);
        let Some(session) = self.session_mut() else {
            return;
        };
        if !session.submit(&query) {
            match fallback {
                Some(index) => session.select(index),
                None => return,
            }
        }
        self.process_events();
        self.mode = InputMode::Map;
    }
}

/// Terminal cell to braille pixel, accounting for the 1-cell border
fn to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdp_map::dataset::{DatasetBuilder, RawRow};

    fn square(name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> BoundaryFeature {
        let mut f = BoundaryFeature::named(name, &name[..3].to_uppercase());
        f.polygons = vec![vec![vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]]];
        f
    }

    fn app() -> App {
        let boundaries = vec![
            square("France", -5.0, 42.0, 8.0, 51.0),
            square("Gabon", 8.0, -4.0, 15.0, 2.0),
            square("Germany", 6.0, 47.0, 15.0, 55.0),
        ];
        let rows: Vec<RawRow> = Vec::new();
        let dataset = DatasetBuilder::default().build(&boundaries, &rows, &rows);
        let mut app = App::new(140, 53);
        app.loaded(dataset, &boundaries);
        app
    }

    #[test]
    fn test_search_enter_exact_focuses() {
        let mut app = app();
        app.open_search();
        for c in "Gabon".chars() {
            app.type_char(c);
        }
        app.submit_search();
        assert_eq!(app.mode, InputMode::Map);
        assert_eq!(app.session().unwrap().selected_index(), Some(1));
        assert!(app.viewport.zoom > 1.0);
    }

    #[test]
    fn test_search_enter_uses_highlighted_suggestion() {
        let mut app = app();
        app.open_search();
        app.type_char('G');
        app.move_highlight(1);
        app.submit_search();
        assert_eq!(app.session().unwrap().selected_index(), Some(2));
    }

    #[test]
    fn test_search_without_match_stays_open() {
        let mut app = app();
        app.open_search();
        app.type_char('x');
        app.submit_search();
        assert_eq!(app.mode, InputMode::Search);
        assert!(app.session().unwrap().selected().is_none());
    }

    #[test]
    fn test_highlight_wraps() {
        let mut app = app();
        app.type_char('G');
        app.move_highlight(-1);
        assert_eq!(app.search.highlighted, 1);
        app.move_highlight(1);
        assert_eq!(app.search.highlighted, 0);
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut app = app();
        app.select(0);
        app.reset_view();
        assert!(app.session().unwrap().selected().is_none());
        assert_eq!(app.viewport.zoom, 1.0);
    }

    #[test]
    fn test_failed_screen() {
        let mut app = App::new(80, 24);
        app.failed(&anyhow::anyhow!("boom"));
        assert!(matches!(app.screen, Screen::Failed(ref m) if m == "boom"));
        assert!(app.suggestions().is_empty());
    }
}
