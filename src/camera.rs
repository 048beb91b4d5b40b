/// Viewport over the grid canvas.
///
/// `pan_x`/`pan_y` are pixel offsets of the window's top-left corner into
/// the logical canvas (the grid at the current zoom), and `zoom` is the
/// size of one cell in pixels. Pan is clamped so the window never leaves
/// the canvas; zoom is bounded between the whole-grid-visible level and a
/// minimum-cells-visible level.
#[derive(Debug, Clone)]
pub struct Camera {
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
    window_w: f64,
    window_h: f64,
    grid_w: f64,
    grid_h: f64,
    min_cells: f64,
    /// Zoom at which the whole grid fits in the window.
    fit_zoom: f64,
    /// Zoom at which `min_cells` cells span the window's smaller extent.
    max_zoom: f64,
}

impl Camera {
    /// Create a viewport at the whole-grid zoom with the origin in view.
    ///
    /// `min_cells` bounds zooming in: at maximum zoom at least that many
    /// cells fit across the window's smaller extent.
    pub fn new(
        window_w: u32,
        window_h: u32,
        grid_w: usize,
        grid_h: usize,
        min_cells: u32,
    ) -> Self {
        let mut camera = Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 0.0,
            window_w: window_w as f64,
            window_h: window_h as f64,
            grid_w: grid_w as f64,
            grid_h: grid_h as f64,
            min_cells: min_cells as f64,
            fit_zoom: 0.0,
            max_zoom: 0.0,
        };
        camera.recompute_bounds();
        camera.zoom = camera.fit_zoom;
        camera
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn window_width(&self) -> f64 {
        self.window_w
    }

    pub fn window_height(&self) -> f64 {
        self.window_h
    }

    /// Shift the view by a pixel delta, clamped to the canvas. An axis
    /// where the canvas is smaller than the window stays pinned at 0.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
        self.clamp_pan();
    }

    /// Step the zoom in. The step is `floor(zoom / fit_zoom)`, never below
    /// one pixel per cell: steps grow as the view zooms in and shrink back
    /// toward 1 as it approaches the fit level.
    pub fn zoom_in(&mut self) {
        let step = self.zoom_step();
        if self.zoom + step < self.max_zoom {
            self.zoom += step;
        } else {
            self.zoom = self.max_zoom;
        }
    }

    /// Step the zoom out and re-clamp pan into the shrunken valid range.
    pub fn zoom_out(&mut self) {
        let step = self.zoom_step();
        if self.zoom - step > self.fit_zoom {
            self.zoom -= step;
        } else {
            self.zoom = self.fit_zoom;
        }
        self.clamp_pan();
    }

    /// Back to the origin at the whole-grid zoom.
    pub fn reset(&mut self) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.zoom = self.fit_zoom;
    }

    /// Adopt a new window size: zoom bounds are recomputed and the current
    /// zoom and pan re-clamped against them.
    pub fn set_window(&mut self, window_w: u32, window_h: u32) {
        self.window_w = window_w as f64;
        self.window_h = window_h as f64;
        self.recompute_bounds();
        self.zoom = self.zoom.clamp(self.fit_zoom, self.max_zoom);
        self.clamp_pan();
    }

    fn recompute_bounds(&mut self) {
        self.fit_zoom = (self.window_w / self.grid_w).min(self.window_h / self.grid_h);
        self.max_zoom = (self.window_w.min(self.window_h) / self.min_cells).max(self.fit_zoom);
    }

    fn zoom_step(&self) -> f64 {
        (self.zoom / self.fit_zoom).floor().max(1.0)
    }

    fn max_pan_x(&self) -> f64 {
        (self.zoom * self.grid_w - self.window_w).max(0.0)
    }

    fn max_pan_y(&self) -> f64 {
        (self.zoom * self.grid_h - self.window_h).max(0.0)
    }

    fn clamp_pan(&mut self) {
        self.pan_x = self.pan_x.clamp(0.0, self.max_pan_x());
        self.pan_y = self.pan_y.clamp(0.0, self.max_pan_y());
    }
}
