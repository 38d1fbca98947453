use crate::braille::BrailleCanvas;
use crate::data::{BoundaryFeature, Polygon};
use crate::dataset::Bounds;
use crate::map::geometry::{contains_point, draw_line, fill_rings};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use rayon::prelude::*;

/// Grid cell size for feature culling and hit testing, in degrees
const GRID_CELL_DEGREES: f64 = 10.0;

/// One country's outline, indexed like the dataset features
pub struct CountryShape {
    pub polygons: Vec<Polygon>,
    pub bounds: Bounds,
}

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_fill: bool,
    pub show_borders: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_fill: true,
            show_borders: true,
            show_labels: true,
        }
    }
}

/// What to paint this frame
pub struct Choropleth<'a> {
    /// Palette bin of every feature
    pub bins: &'a [usize],
    pub bin_count: usize,
    /// Feature drawn with an emphasized outline
    pub highlight: Option<usize>,
    /// Feature whose name is placed at its center
    pub label: Option<(usize, &'a str)>,
}

/// Rendered canvases, back to front
pub struct MapLayers {
    /// One canvas per palette bin
    pub fills: Vec<BrailleCanvas>,
    pub borders: BrailleCanvas,
    pub highlight: BrailleCanvas,
    pub labels: Vec<(u16, u16, String)>,
}

/// Braille choropleth renderer over country polygons
pub struct MapRenderer {
    shapes: Vec<CountryShape>,
    grid: FeatureGrid,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            grid: FeatureGrid::new(GRID_CELL_DEGREES),
            settings: DisplaySettings::default(),
        }
    }

    /// Shapes in the same order as the boundary features
    pub fn from_boundaries(features: &[BoundaryFeature]) -> Self {
        let shapes: Vec<CountryShape> = features
            .iter()
            .map(|f| CountryShape {
                polygons: f.polygons.clone(),
                bounds: f.bounds(),
            })
            .collect();
        let grid = FeatureGrid::build(shapes.iter().map(|s| &s.bounds), GRID_CELL_DEGREES);
        Self {
            shapes,
            grid,
            settings: DisplaySettings::default(),
        }
    }

    /// Check if any data is loaded
    pub fn has_data(&self) -> bool {
        !self.shapes.is_empty()
    }

    /// Render all map layers for a canvas of `width` x `height` characters
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        style: &Choropleth<'_>,
    ) -> MapLayers {
        let visible = self.grid.query(&viewport.visible_bounds());

        // Fill each palette bin on its own canvas
        let fills = if self.settings.show_fill {
            (0..style.bin_count)
                .into_par_iter()
                .map(|bin| {
                    let mut canvas = BrailleCanvas::new(width, height);
                    for &idx in &visible {
                        if style.bins.get(idx) == Some(&bin) {
                            self.fill_shape(&mut canvas, &self.shapes[idx], viewport);
                        }
                    }
                    canvas
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut borders = BrailleCanvas::new(width, height);
        if self.settings.show_borders {
            for &idx in &visible {
                self.outline_shape(&mut borders, &self.shapes[idx], viewport);
            }
        }

        let mut highlight = BrailleCanvas::new(width, height);
        if let Some(shape) = style.highlight.and_then(|i| self.shapes.get(i)) {
            self.outline_shape(&mut highlight, shape, viewport);
        }

        let mut labels = Vec::new();
        if self.settings.show_labels {
            if let Some((idx, name)) = style.label {
                if let Some(shape) = self.shapes.get(idx) {
                    let (lon, lat) = shape.bounds.center();
                    let (px, py) = viewport.project(lon, lat);
                    if viewport.is_visible(px, py) && px >= 0 && py >= 0 {
                        // Center the text on the point (braille -> char coords)
                        let char_x = (px / 2) as u16;
                        let char_y = (py / 4) as u16;
                        let half = (name.chars().count() / 2) as u16;
                        labels.push((char_x.saturating_sub(half), char_y, name.to_string()));
                    }
                }
            }
        }

        MapLayers {
            fills,
            borders,
            highlight,
            labels,
        }
    }

    fn fill_shape(&self, canvas: &mut BrailleCanvas, shape: &CountryShape, viewport: &Viewport) {
        for polygon in &shape.polygons {
            let rings: Vec<Vec<(f64, f64)>> = polygon
                .iter()
                .map(|ring| {
                    ring.iter()
                        .map(|&(lon, lat)| viewport.project_f(lon, lat))
                        .collect()
                })
                .collect();
            fill_rings(canvas, &rings);
        }
    }

    fn outline_shape(&self, canvas: &mut BrailleCanvas, shape: &CountryShape, viewport: &Viewport) {
        for polygon in &shape.polygons {
            for ring in polygon {
                self.draw_linestring(canvas, ring, viewport);
            }
        }
    }

    /// Draw a linestring with viewport culling
    fn draw_linestring(&self, canvas: &mut BrailleCanvas, line: &[(f64, f64)], viewport: &Viewport) {
        if line.len() < 2 {
            return;
        }

        let mut prev: Option<(i32, i32)> = None;

        for &(lon, lat) in line {
            let (px, py) = viewport.project(lon, lat);

            if let Some((prev_x, prev_y)) = prev {
                let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }

            prev = Some((px, py));
        }
    }

    /// Index of the first feature containing the point
    pub fn feature_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .find(|&idx| {
                let shape = &self.shapes[idx];
                shape.bounds.contains(lon, lat)
                    && shape
                        .polygons
                        .iter()
                        .any(|polygon| contains_point(polygon, lon, lat))
            })
    }

    /// Toggle country name labels
    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }

    /// Toggle borders
    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }

    /// Toggle choropleth fill
    pub fn toggle_fill(&mut self) {
        self.settings.show_fill = !self.settings.show_fill;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}
