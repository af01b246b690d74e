//! Web Mercator camera math.
//!
//! Mirrors how Leaflet frames bounds (`getBoundsZoom` + `fitBounds`) so that
//! the headless preview and the browser agree on the zoom a region fits at.

use geo::{Coord, Rect};
use serde::Serialize;

pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
const MAX_LAT: f64 = 85.051_128_779_806_6;

/// Leaflet's default when no tile layer sets a lower ceiling.
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// How a region is framed after activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitOptions {
    /// Pixels kept clear on each side (x, y).
    pub padding: [f64; 2],
    /// Ceiling for the fitted zoom, however small the region.
    pub max_zoom: f64,
    pub animate: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: [50.0, 50.0],
            max_zoom: 7.0,
            animate: true,
        }
    }
}

/// Project lon/lat to world pixel coordinates at `zoom`.
pub fn project(lon: f64, lat: f64, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * zoom.exp2();
    let lat = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (lon + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    (x, y)
}

/// Inverse of [`project`]; returns (lon, lat).
pub fn unproject(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * zoom.exp2();
    let lon = x / scale * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / scale);
    let lat = n.sinh().atan().to_degrees();
    (lon, lat)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LatLon,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom levels are floored to a multiple of this; 0 disables snapping.
    pub zoom_snap: f64,
    pub size: ViewportSize,
}

impl Camera {
    pub fn new(center: LatLon, zoom: f64, min_zoom: f64, size: ViewportSize) -> Self {
        Self {
            center,
            zoom: zoom.max(min_zoom),
            min_zoom,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_snap: 0.5,
            size,
        }
    }

    /// Zoom at which `bounds` fits the viewport minus padding, ignoring the
    /// fit ceiling but honouring the camera's own limits.
    pub fn bounds_zoom(&self, bounds: Rect<f64>, padding: [f64; 2]) -> f64 {
        let avail_x = (self.size.width - 2.0 * padding[0]).max(1.0);
        let avail_y = (self.size.height - 2.0 * padding[1]).max(1.0);

        let (min, max) = (bounds.min(), bounds.max());
        let (x0, y0) = project(min.x, max.y, 0.0);
        let (x1, y1) = project(max.x, min.y, 0.0);
        let scale = (avail_x / (x1 - x0).abs()).min(avail_y / (y1 - y0).abs());

        let mut zoom = scale.log2();
        if self.zoom_snap > 0.0 && zoom.is_finite() {
            let fine = self.zoom_snap / 100.0;
            zoom = (zoom / fine).round() * fine;
            zoom = (zoom / self.zoom_snap).floor() * self.zoom_snap;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Frame `bounds`. The resulting zoom never exceeds `fit.max_zoom`.
    pub fn fit_bounds(&mut self, bounds: Rect<f64>, fit: &FitOptions) {
        let zoom = self.bounds_zoom(bounds, fit.padding).min(fit.max_zoom);

        let (min, max) = (bounds.min(), bounds.max());
        let (sw_x, sw_y) = project(min.x, min.y, zoom);
        let (ne_x, ne_y) = project(max.x, max.y, zoom);
        let (lon, lat) = unproject((sw_x + ne_x) / 2.0, (sw_y + ne_y) / 2.0, zoom);

        self.center = LatLon::new(lat, lon);
        self.zoom = zoom;
    }

    /// Position of lon/lat relative to the viewport's top-left corner.
    pub fn to_viewport(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (cx, cy) = project(self.center.lon, self.center.lat, self.zoom);
        let (x, y) = project(lon, lat, self.zoom);
        (
            x - cx + self.size.width / 2.0,
            y - cy + self.size.height / 2.0,
        )
    }

    /// Lon/lat rectangle currently on screen.
    pub fn visible_bounds(&self) -> Rect<f64> {
        let (cx, cy) = project(self.center.lon, self.center.lat, self.zoom);
        let (w, e) = (cx - self.size.width / 2.0, cx + self.size.width / 2.0);
        let (n, s) = (cy - self.size.height / 2.0, cy + self.size.height / 2.0);
        let (min_lon, min_lat) = unproject(w, s, self.zoom);
        let (max_lon, max_lat) = unproject(e, n, self.zoom);
        Rect::new(
            Coord { x: min_lon, y: min_lat },
            Coord { x: max_lon, y: max_lat },
        )
    }
}
