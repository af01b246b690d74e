use geo::Rect;

use crate::camera::{Camera, FitOptions, LatLon, ViewportSize};
use crate::regions::{RegionId, RegionSet};
use crate::selection::{MapSurface, RegionStyle};

/// Pixel size of one terminal cell; chars are ~2x taller than wide.
const CELL_W: f64 = 8.0;
const CELL_H: f64 = 16.0;

const BORDER: char = '\u{00b7}';
const HIGHLIGHT: char = '#';

/// Headless map surface that draws region borders as ASCII.
pub struct TerminalMap<'a> {
    regions: &'a RegionSet,
    camera: Camera,
    width: usize,
    height: usize,
    styles: Vec<RegionStyle>,
    bound: Vec<bool>,
}

impl<'a> TerminalMap<'a> {
    pub fn new(
        regions: &'a RegionSet,
        center: LatLon,
        zoom: f64,
        min_zoom: f64,
        width: usize,
        height: usize,
    ) -> Self {
        let size = ViewportSize {
            width: width as f64 * CELL_W,
            height: height as f64 * CELL_H,
        };
        Self {
            regions,
            camera: Camera::new(center, zoom, min_zoom, size),
            width,
            height,
            styles: vec![RegionStyle::DEFAULT; regions.len()],
            bound: vec![false; regions.len()],
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_bound(&self, id: RegionId) -> bool {
        self.bound.get(id.0).copied().unwrap_or(false)
    }

    /// Render the current camera view: highlighted borders in `#`, the
    /// rest in `·`, region names at their centroids.
    pub fn render(&self) -> String {
        let mut grid = vec![vec![' '; self.width]; self.height];
        let view = self.camera.visible_bounds();

        for region in self.regions.regions() {
            if !overlaps(&region.bounds, &view) {
                continue;
            }
            let emphasis = self.style(region.id).emphasis;
            let ch = if emphasis { HIGHLIGHT } else { BORDER };

            for poly in &region.boundary {
                for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                    for edge in ring.lines() {
                        let from = self.cell(edge.start.x, edge.start.y);
                        let to = self.cell(edge.end.x, edge.end.y);
                        rasterize_edge(from, to, ch, emphasis, &mut grid);
                    }
                }
            }
        }

        // Place names at centroids
        for region in self.regions.regions() {
            let emphasis = self.style(region.id).emphasis;
            let (col, row) = self.cell(region.centroid.x(), region.centroid.y());
            let label = &region.name;
            let start_col = col - (label.chars().count() as isize / 2);

            for (j, ch) in label.chars().enumerate() {
                let c = start_col + j as isize;
                if c >= 0 && (c as usize) < self.width && row >= 0 && (row as usize) < self.height {
                    let cell = &mut grid[row as usize][c as usize];
                    // Selected label always writes; others only on empty or plain border
                    if emphasis || *cell == ' ' || *cell == BORDER {
                        *cell = ch;
                    }
                }
            }
        }

        grid.iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn style(&self, id: RegionId) -> &RegionStyle {
        self.styles.get(id.0).unwrap_or(&RegionStyle::DEFAULT)
    }

    fn cell(&self, lon: f64, lat: f64) -> (isize, isize) {
        let (x, y) = self.camera.to_viewport(lon, lat);
        ((x / CELL_W).floor() as isize, (y / CELL_H).floor() as isize)
    }
}

impl MapSurface for TerminalMap<'_> {
    fn shapes(&self) -> Vec<RegionId> {
        self.regions.regions().iter().map(|r| r.id).collect()
    }

    fn shape_bounds(&self, id: RegionId) -> Option<Rect<f64>> {
        self.regions.get(id).map(|r| r.bounds)
    }

    fn set_style(&mut self, id: RegionId, style: &RegionStyle) {
        if let Some(slot) = self.styles.get_mut(id.0) {
            *slot = *style;
        }
    }

    fn bind_activation(&mut self, id: RegionId) {
        if let Some(slot) = self.bound.get_mut(id.0) {
            *slot = true;
        }
    }

    fn unbind_activation(&mut self, id: RegionId) {
        if let Some(slot) = self.bound.get_mut(id.0) {
            *slot = false;
        }
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, fit: &FitOptions) {
        self.camera.fit_bounds(bounds, fit);
    }
}

fn overlaps(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    !(a.max().x < b.min().x
        || a.min().x > b.max().x
        || a.max().y < b.min().y
        || a.min().y > b.max().y)
}

/// Rasterize a line segment onto the grid using Bresenham's algorithm.
fn rasterize_edge(
    (c0, r0): (isize, isize),
    (c1, r1): (isize, isize),
    ch: char,
    is_selected: bool,
    grid: &mut [Vec<char>],
) {
    let height = grid.len() as isize;
    let width = grid.first().map_or(0, |row| row.len()) as isize;

    // Skip segments entirely off one side of the grid
    if (c0 < 0 && c1 < 0)
        || (r0 < 0 && r1 < 0)
        || (c0 >= width && c1 >= width)
        || (r0 >= height && r1 >= height)
    {
        return;
    }

    let mut x = c0;
    let mut y = r0;
    let dx = (c1 - c0).abs();
    let dy = -(r1 - r0).abs();
    let sx = if c0 < c1 { 1 } else { -1 };
    let sy = if r0 < r1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x >= 0 && x < width && y >= 0 && y < height {
            let cell = &mut grid[y as usize][x as usize];
            // Selected borders overwrite plain borders; plain borders only on empty
            if is_selected || *cell == ' ' {
                *cell = ch;
            }
        }

        if x == c1 && y == r1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
