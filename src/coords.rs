//! Transforms between window pixels and grid cells.
//!
//! The viewport is described by `(pan_x, pan_y)` pixel offsets into the
//! logical canvas and `zoom`, the size of one cell in pixels. All functions
//! here are pure; the camera owns the values fed into them.

use std::ops::Range;

/// Fraction of a cell's extent left as the grid-line gap on each edge.
const GRID_GAP_DIVISOR: f64 = 25.0;

/// On-screen rectangle of a single cell, in window pixels. `x`/`y` can be
/// negative when the cell is partly scrolled off the left or top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Grid coordinates of the cell under a pixel position.
///
/// Floors per axis (`floor(pan/zoom + pixel/zoom)`), so fractional
/// grid-space positions resolve to the cell they fall in at every pan and
/// zoom.
pub fn screen_to_cell(px: f64, py: f64, zoom: f64, pan_x: f64, pan_y: f64) -> (i64, i64) {
    let x = (pan_x / zoom + px / zoom).floor() as i64;
    let y = (pan_y / zoom + py / zoom).floor() as i64;
    (x, y)
}

/// Linear index of the cell under a pixel position, or `None` when the
/// position falls outside the grid (the canvas can be smaller than the
/// window on an axis at the whole-grid zoom).
pub fn screen_to_index(
    px: f64,
    py: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    width: usize,
    height: usize,
) -> Option<usize> {
    let (x, y) = screen_to_cell(px, py, zoom, pan_x, pan_y);
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return None;
    }
    Some(x as usize + y as usize * width)
}

/// Pixel rectangle of the cell at `index`, inset by `zoom / 25` on the left
/// and top for the grid-line gap. When the inset corner still lands at a
/// negative screen coordinate the matching extent shrinks by one pixel,
/// which keeps the gap from smearing along the viewport edge.
pub fn cell_rect(index: usize, zoom: f64, pan_x: f64, pan_y: f64, width: usize) -> CellRect {
    let gap = zoom / GRID_GAP_DIVISOR;
    let cx = (index % width) as f64;
    let cy = (index / width) as f64;
    let x = cx * zoom + gap - pan_x;
    let y = cy * zoom + gap - pan_y;
    let w = zoom - gap - if x < 0.0 { 1.0 } else { 0.0 };
    let h = zoom - gap - if y < 0.0 { 1.0 } else { 0.0 };
    CellRect {
        x: x as f32,
        y: y as f32,
        w: w as f32,
        h: h as f32,
    }
}

/// Minimal range of cell columns (or rows, fed the y-axis values) whose
/// rectangles can intersect a window of `window` pixels.
pub fn visible_range(pan: f64, zoom: f64, window: f64, grid_extent: usize) -> Range<usize> {
    let first = ((pan / zoom).floor() as usize).min(grid_extent);
    let last = (first + (window / zoom).floor() as usize + 2).min(grid_extent);
    first..last
}
