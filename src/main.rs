mod app;
mod camera;
mod coords;
mod grid;
mod input;
mod renderer;

use winit::event_loop::EventLoop;

fn main() {
    env_logger::init();

    log::info!("Cellscape - Conway's Game of Life on a pannable grid");
    log::info!("Controls:");
    log::info!("  Space        - Start / stop the simulation");
    log::info!("  Left Mouse   - Paint cells alive");
    log::info!("  Right Mouse  - Paint cells dead");
    log::info!("  Middle Drag  - Pan");
    log::info!("  Scroll       - Zoom in / out");
    log::info!("  R            - Reset grid and viewport");
    log::info!("  Escape       - Quit");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = app::App::new(app::SessionParams::default());
    event_loop.run_app(&mut app).expect("Event loop error");
}
