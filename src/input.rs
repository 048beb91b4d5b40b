use crate::camera::Camera;
use crate::coords;
use crate::grid::{Cell, Grid};

/// A discrete gesture from the windowing surface, already stripped of
/// platform detail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Absolute cursor position in window pixels.
    PointerMoved { x: f64, y: f64 },
    Pressed(Button),
    Released(Button),
    Key(Command),
}

/// Pointer buttons the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Hold to drag the viewport.
    Pan,
    /// Hold to paint cells alive.
    DrawAlive,
    /// Hold to paint cells dead.
    DrawDead,
    /// One wheel notch in; acts on press.
    ZoomIn,
    /// One wheel notch out; acts on press.
    ZoomOut,
}

/// Keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleRun,
    Reset,
}

/// Interaction state for one session: cursor position, whether the view is
/// being dragged, and the paint value currently held. Owns no grid or
/// camera state; both are passed in per event.
#[derive(Debug, Default)]
pub struct Dispatcher {
    cursor: (f64, f64),
    panning: bool,
    painting: Option<Cell>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one input event to the session.
    pub fn handle(&mut self, event: Event, grid: &mut Grid, camera: &mut Camera) {
        match event {
            Event::PointerMoved { x, y } => {
                if self.panning {
                    // Drag moves the content with the cursor: the pan
                    // offset shifts opposite to the pointer delta.
                    camera.pan_by(self.cursor.0 - x, self.cursor.1 - y);
                }
                self.cursor = (x, y);
            }
            Event::Pressed(Button::Pan) => self.panning = true,
            Event::Released(Button::Pan) => self.panning = false,
            Event::Pressed(Button::DrawAlive) => self.painting = Some(Cell::Alive),
            Event::Pressed(Button::DrawDead) => self.painting = Some(Cell::Dead),
            Event::Released(Button::DrawAlive) | Event::Released(Button::DrawDead) => {
                self.painting = None;
            }
            Event::Pressed(Button::ZoomIn) => camera.zoom_in(),
            Event::Pressed(Button::ZoomOut) => camera.zoom_out(),
            Event::Released(Button::ZoomIn) | Event::Released(Button::ZoomOut) => {}
            Event::Key(Command::ToggleRun) => {
                grid.toggle_running();
                log::info!(
                    "Simulation {}",
                    if grid.running() { "running" } else { "stopped" }
                );
            }
            Event::Key(Command::Reset) => {
                grid.reset();
                camera.reset();
                log::info!("Grid and viewport reset");
            }
        }
    }

    /// Paint the cell under the cursor with the held paint value, if any.
    ///
    /// Called once per loop iteration, so a held button keeps painting as
    /// the cursor or the viewport moves. Cursor positions outside the grid
    /// are ignored.
    pub fn apply_paint(&self, grid: &mut Grid, camera: &Camera) {
        let Some(value) = self.painting else { return };
        let (x, y) = self.cursor;
        let index = coords::screen_to_index(
            x,
            y,
            camera.zoom(),
            camera.pan_x(),
            camera.pan_y(),
            grid.width(),
            grid.height(),
        );
        if let Some(index) = index {
            grid.set_cell(index, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Dispatcher, Grid, Camera) {
        // 100-pixel window over a 10x10 grid: fit zoom is 10 px/cell,
        // maximum zoom 20 (5 cells across).
        let grid = Grid::new(10, 10).unwrap();
        let camera = Camera::new(100, 100, 10, 10, 5);
        (Dispatcher::new(), grid, camera)
    }

    #[test]
    fn paint_sets_cell_under_cursor_while_button_held() {
        let (mut input, mut grid, mut camera) = session();
        input.handle(Event::PointerMoved { x: 35.0, y: 21.0 }, &mut grid, &mut camera);
        input.handle(Event::Pressed(Button::DrawAlive), &mut grid, &mut camera);
        input.apply_paint(&mut grid, &camera);
        assert!(grid.cell(grid.index_of(3, 2)).is_alive());
        assert_eq!(grid.population(), 1);
    }

    #[test]
    fn released_button_stops_painting() {
        let (mut input, mut grid, mut camera) = session();
        input.handle(Event::Pressed(Button::DrawAlive), &mut grid, &mut camera);
        input.handle(Event::Released(Button::DrawAlive), &mut grid, &mut camera);
        input.apply_paint(&mut grid, &camera);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn draw_dead_erases() {
        let (mut input, mut grid, mut camera) = session();
        let index = grid.index_of(1, 1);
        grid.set_cell(index, Cell::Alive);
        input.handle(Event::PointerMoved { x: 15.0, y: 15.0 }, &mut grid, &mut camera);
        input.handle(Event::Pressed(Button::DrawDead), &mut grid, &mut camera);
        input.apply_paint(&mut grid, &camera);
        assert!(!grid.cell(index).is_alive());
    }

    #[test]
    fn paint_ignores_positions_outside_the_grid() {
        let mut grid = Grid::new(10, 10).unwrap();
        // Wide window: the 10-cell canvas only covers the left half.
        let mut camera = Camera::new(200, 100, 10, 10, 25);
        let mut input = Dispatcher::new();
        input.handle(Event::PointerMoved { x: 150.0, y: 50.0 }, &mut grid, &mut camera);
        input.handle(Event::Pressed(Button::DrawAlive), &mut grid, &mut camera);
        input.apply_paint(&mut grid, &camera);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn drag_pans_the_camera_against_pointer_motion() {
        let (mut input, mut grid, mut camera) = session();
        // Zoom in so there is pan range to move through.
        for _ in 0..6 {
            camera.zoom_in();
        }
        input.handle(Event::PointerMoved { x: 50.0, y: 50.0 }, &mut grid, &mut camera);
        input.handle(Event::Pressed(Button::Pan), &mut grid, &mut camera);
        input.handle(Event::PointerMoved { x: 30.0, y: 45.0 }, &mut grid, &mut camera);
        assert_eq!(camera.pan_x(), 20.0);
        assert_eq!(camera.pan_y(), 5.0);

        // After release the pointer moves freely.
        input.handle(Event::Released(Button::Pan), &mut grid, &mut camera);
        input.handle(Event::PointerMoved { x: 0.0, y: 0.0 }, &mut grid, &mut camera);
        assert_eq!(camera.pan_x(), 20.0);
        assert_eq!(camera.pan_y(), 5.0);
    }

    #[test]
    fn wheel_steps_zoom() {
        let (mut input, mut grid, mut camera) = session();
        let before = camera.zoom();
        input.handle(Event::Pressed(Button::ZoomIn), &mut grid, &mut camera);
        assert!(camera.zoom() > before);
        input.handle(Event::Pressed(Button::ZoomOut), &mut grid, &mut camera);
        assert!((camera.zoom() - before).abs() < 1e-9);
    }

    #[test]
    fn toggle_run_flips_the_run_flag() {
        let (mut input, mut grid, mut camera) = session();
        input.handle(Event::Key(Command::ToggleRun), &mut grid, &mut camera);
        assert!(grid.running());
        input.handle(Event::Key(Command::ToggleRun), &mut grid, &mut camera);
        assert!(!grid.running());
    }

    #[test]
    fn reset_clears_grid_and_viewport() {
        let (mut input, mut grid, mut camera) = session();
        grid.set_cell(0, Cell::Alive);
        grid.toggle_running();
        camera.zoom_in();
        input.handle(Event::Key(Command::Reset), &mut grid, &mut camera);
        assert_eq!(grid.population(), 0);
        assert!(!grid.running());
        assert!((camera.zoom() - 10.0).abs() < 1e-9);
        assert_eq!(camera.pan_x(), 0.0);
    }
}
