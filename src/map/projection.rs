use crate::dataset::Bounds;
use std::f64::consts::PI;

/// Web Mercator is undefined at the poles
const MAX_LAT: f64 = 85.05;

/// Normalized Web Mercator coordinates in [0, 1]
fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT) * PI / 180.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

/// Viewport representing the visible map area and zoom level
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Create a world view (shows entire world)
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        // Clamp latitude
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(100.0);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(0.5);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor towards a specific pixel location
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        // Get the geographic coordinates under the mouse
        let (lon, lat) = self.unproject(px, py);

        // Apply the zoom
        let new_zoom = (self.zoom * factor).clamp(0.5, 100.0);
        self.zoom = new_zoom;

        // Calculate where that point would now project to
        let (new_px, new_py) = self.project(lon, lat);

        // Calculate the offset needed to bring it back under the mouse
        let dx = new_px - px;
        let dy = new_py - py;

        // Pan to compensate
        self.pan(dx, dy);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;
        let (center_x, center_y) = mercator(self.center_lon, self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        // Convert from Web Mercator normalized coords back to lon/lat
        let lon = x * 360.0 - 180.0;

        // Inverse Mercator for latitude
        let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
        let lat = lat_rad * 180.0 / PI;

        (lon, lat)
    }

    /// Project to sub-pixel coordinates (used by polygon fill)
    pub fn project_f(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = mercator(lon, lat);
        let (center_x, center_y) = mercator(self.center_lon, self.center_lat);
        let scale = self.zoom * self.width as f64;

        (
            (x - center_x) * scale + self.width as f64 / 2.0,
            (y - center_y) * scale + self.height as f64 / 2.0,
        )
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.project_f(lon, lat);
        (px as i32, py as i32)
    }

    /// Geographic box covered by the canvas
    pub fn visible_bounds(&self) -> Bounds {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        Bounds {
            min_lon: west.max(-180.0),
            min_lat: south.max(-90.0),
            max_lon: east.min(180.0),
            max_lat: north.min(90.0),
        }
    }

    /// Center on a bounding box and zoom so it fills most of the canvas
    pub fn fit_bounds(&mut self, bounds: &Bounds) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (x0, y0) = mercator(bounds.min_lon, bounds.max_lat);
        let (x1, y1) = mercator(bounds.max_lon, bounds.min_lat);
        let span_x = (x1 - x0).abs().max(1e-6);
        let span_y = (y1 - y0).abs().max(1e-6);

        // 10% margin around the box
        let zoom_x = 1.0 / span_x;
        let zoom_y = self.height as f64 / (self.width as f64 * span_y);
        self.zoom = (zoom_x.min(zoom_y) * 0.9).clamp(0.5, 100.0);

        let cx = (x0 + x1) / 2.0;
        let cy = (y0 + y1) / 2.0;
        self.center_lon = cx * 360.0 - 180.0;
        self.center_lat = ((PI * (1.0 - 2.0 * cy)).sinh().atan() * 180.0 / PI).clamp(-85.0, 85.0);
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}
