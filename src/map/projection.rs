use std::f64::consts::PI;

use super::layer::Bounds;

/// Contiguous US, used for the national view
pub const CONUS: Bounds = Bounds::from_coords(-125.0, 24.0, -66.5, 49.5);

/// Web-map zoom of the national view; state zoom levels are relative to it
const NATIONAL_WEB_ZOOM: f64 = 3.5;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 2000.0;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (1.0 = whole world spans the canvas width)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Normalized Web Mercator y for a latitude
#[inline]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-85.0, 85.0) * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Web-map zoom used when flying to a state
pub fn state_web_zoom(abbr: &str) -> f64 {
    const SMALL: [&str; 10] = ["CT", "DE", "DC", "HI", "MA", "MD", "NH", "NJ", "RI", "VT"];
    const LARGE: [&str; 5] = ["AK", "TX", "CA", "MT", "NM"];
    if SMALL.contains(&abbr) {
        7.0
    } else if LARGE.contains(&abbr) {
        5.0
    } else {
        6.0
    }
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

    /// Lower 48 filling the canvas
    pub fn national(width: usize, height: usize) -> Self {
        let mut vp = Self::new(-97.0, 39.0, 1.0, width, height);
        vp.fit_bounds(&CONUS);
        vp
    }

    /// Zoom that makes `bounds` fill the canvas, with a small margin
    pub fn zoom_to_fit(&self, bounds: &Bounds) -> f64 {
        let w = self.width.max(1) as f64;
        let h = self.height.max(1) as f64;
        let dx = ((bounds.max.x - bounds.min.x) / 360.0).max(1e-9);
        let dy = (mercator_y(bounds.min.y) - mercator_y(bounds.max.y)).max(1e-9);
        // scale = zoom * width, so the x extent in pixels is dx * zoom * width
        let zoom_x = 1.0 / dx;
        let zoom_y = h / (dy * w);
        (zoom_x.min(zoom_y) * 0.92).clamp(MIN_ZOOM, MAX_ZOOM)
    }

    pub fn fit_bounds(&mut self, bounds: &Bounds) {
        let center = bounds.center();
        self.center_lon = center.x;
        self.center_lat = center.y;
        self.zoom = self.zoom_to_fit(bounds);
    }

    /// Center on a state at its fly-to zoom, scaled against the national view
    pub fn fly_to_state(&mut self, abbr: &str, bounds: &Bounds) {
        let national = self.zoom_to_fit(&CONUS);
        let center = bounds.center();
        self.center_lon = center.x;
        self.center_lat = center.y;
        let zoom = national * 2f64.powf(state_web_zoom(abbr) - NATIONAL_WEB_ZOOM);
        // Never crop the state itself
        self.zoom = zoom.min(self.zoom_to_fit(bounds)).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the point under the cursor fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pan back so the same point lands under the cursor
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Pixel coordinates back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        self.unproject_f(px as f64, py as f64)
    }

    /// Sub-pixel variant, used to sample cell centers
    pub fn unproject_f(&self, px: f64, py: f64) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px - self.width as f64 / 2.0) / scale + center_x;
        let y = (py - self.height as f64 / 2.0) / scale + center_y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;
        (lon, lat)
    }

    /// (lon, lat) to pixel coordinates (Web Mercator)
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);
        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;
        (px, py)
    }

    /// Geographic bounds currently on screen
    pub fn visible_bounds(&self) -> Bounds {
        let (min_lon, max_lat) = self.unproject(0, 0);
        let (max_lon, min_lat) = self.unproject(self.width as i32, self.height as i32);
        Bounds::from_coords(min_lon, min_lat, max_lon, max_lat)
    }

    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Rough bounding-box check for a segment
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(-97.0, 39.0, 6.0, 200, 120);
        assert_eq!(vp.project(-97.0, 39.0), (100, 60));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::national(240, 140);
        let (px, py) = vp.project(-119.8, 39.5);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - -119.8).abs() < 0.5);
        assert!((lat - 39.5).abs() < 0.5);
    }

    #[test]
    fn test_national_view_fits_conus() {
        let vp = Viewport::national(240, 140);
        let (x0, y0) = vp.project(CONUS.min.x, CONUS.max.y);
        let (x1, y1) = vp.project(CONUS.max.x, CONUS.min.y);
        assert!(x0 >= 0 && x1 <= 240, "x span {x0}..{x1}");
        assert!(y0 >= 0 && y1 <= 140, "y span {y0}..{y1}");
    }

    #[test]
    fn test_state_zoom_levels() {
        assert_eq!(state_web_zoom("RI"), 7.0);
        assert_eq!(state_web_zoom("TX"), 5.0);
        assert_eq!(state_web_zoom("OH"), 6.0);

        let mut vp = Viewport::national(240, 140);
        let national = vp.zoom;
        let ohio = Bounds::from_coords(-84.8, 38.4, -80.5, 42.0);
        vp.fly_to_state("OH", &ohio);
        assert!(vp.zoom > national);
        assert!((vp.center_lon - -82.65).abs() < 1e-9);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }
}
