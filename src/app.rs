use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::grid::Grid;
use crate::input::{Button, Command, Dispatcher, Event};
use crate::renderer::{self, Renderer};

/// Session parameters, fixed when the application starts.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub window_width: u32,
    pub window_height: u32,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Render frames per simulation step.
    pub sim_cadence: u32,
    /// At maximum zoom, at least this many cells span the window.
    pub min_cells_visible: u32,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 800,
            grid_width: 1000,
            grid_height: 300,
            sim_cadence: 10,
            min_cells_visible: 25,
        }
    }
}

/// Application state: the session (grid, viewport, interaction) plus the
/// window and GPU resources once they exist.
pub struct App {
    gpu: Option<GpuState>,
    params: SessionParams,
    grid: Grid,
    camera: Camera,
    input: Dispatcher,
    /// Render frames since the last simulation step.
    frame: u32,
}

struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
}

impl App {
    pub fn new(params: SessionParams) -> Self {
        let grid =
            Grid::new(params.grid_width, params.grid_height).expect("valid grid dimensions");
        let camera = Camera::new(
            params.window_width,
            params.window_height,
            params.grid_width,
            params.grid_height,
            params.min_cells_visible,
        );

        Self {
            gpu: None,
            params,
            grid,
            camera,
            input: Dispatcher::new(),
            frame: 0,
        }
    }

    fn initialize_gpu(&mut self, window: Arc<Window>) {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("No suitable GPU adapter found");

        log::info!("GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.camera.set_window(config.width, config.height);

        let renderer = Renderer::new(&device, surface_format);
        renderer.update_screen(&queue, config.width, config.height);

        self.gpu = Some(GpuState {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        });
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(ref mut gpu) = self.gpu {
            if new_size.width > 0 && new_size.height > 0 {
                gpu.config.width = new_size.width;
                gpu.config.height = new_size.height;
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.renderer
                    .update_screen(&gpu.queue, new_size.width, new_size.height);
                self.camera.set_window(new_size.width, new_size.height);
            }
        }
    }

    fn dispatch(&mut self, event: Event) {
        self.input.handle(event, &mut self.grid, &mut self.camera);
    }

    fn handle_key(&mut self, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }

        match event.logical_key {
            Key::Named(NamedKey::Space) => self.dispatch(Event::Key(Command::ToggleRun)),
            Key::Character(ref c) if c.as_str() == "r" => {
                self.dispatch(Event::Key(Command::Reset));
                self.frame = 0;
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) {
        // A held draw button paints the cell under the cursor every frame,
        // following cursor and viewport motion. Runs before the simulation
        // step so edits land in the generation about to be advanced.
        self.input.apply_paint(&mut self.grid, &self.camera);

        self.frame += 1;
        if self.frame >= self.params.sim_cadence {
            self.frame = 0;
            self.grid.simulate();
        }

        let Some(ref mut gpu) = self.gpu else { return };

        let instances = renderer::build_instances(&self.grid, &self.camera);
        gpu.renderer
            .upload_instances(&gpu.device, &gpu.queue, &instances);

        let output = match gpu.surface.get_current_texture() {
            Ok(tex) => tex,
            Err(wgpu::SurfaceError::Lost) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                return;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        gpu.renderer.render(&mut encoder, &view);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        let status = if self.grid.running() { "▶" } else { "⏸" };
        gpu.window.set_title(&format!(
            "Cellscape | {status} Gen {} | Pop {} | {}×{} | {:.1} px/cell",
            self.grid.generation(),
            self.grid.population(),
            self.grid.width(),
            self.grid.height(),
            self.camera.zoom(),
        ));

        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_none() {
            let attrs = WindowAttributes::default()
                .with_title("Cellscape - Conway's Game of Life")
                .with_inner_size(PhysicalSize::new(
                    self.params.window_width,
                    self.params.window_height,
                ))
                .with_resizable(false);

            let window = Arc::new(
                event_loop
                    .create_window(attrs)
                    .expect("Failed to create window"),
            );

            self.initialize_gpu(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size);
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                {
                    event_loop.exit();
                } else {
                    self.handle_key(event);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / 50.0,
                };
                if scroll > 0.0 {
                    self.dispatch(Event::Pressed(Button::ZoomIn));
                } else if scroll < 0.0 {
                    self.dispatch(Event::Pressed(Button::ZoomOut));
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let mapped = match button {
                    MouseButton::Middle => Some(Button::Pan),
                    MouseButton::Left => Some(Button::DrawAlive),
                    MouseButton::Right => Some(Button::DrawDead),
                    _ => None,
                };
                if let Some(button) = mapped {
                    let event = if state == ElementState::Pressed {
                        Event::Pressed(button)
                    } else {
                        Event::Released(button)
                    };
                    self.dispatch(event);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.dispatch(Event::PointerMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_params() {
        let params = SessionParams::default();
        assert_eq!((params.grid_width, params.grid_height), (1000, 300));
        assert_eq!(params.sim_cadence, 10);
        assert_eq!(params.min_cells_visible, 25);
    }

    #[test]
    fn simulation_advances_every_cadence_frames() {
        let mut app = App::new(SessionParams {
            window_width: 100,
            window_height: 100,
            grid_width: 10,
            grid_height: 10,
            sim_cadence: 3,
            min_cells_visible: 5,
        });
        // Blinker, running.
        for index in [grid_index(&app.grid, 3, 4), grid_index(&app.grid, 4, 4), grid_index(&app.grid, 5, 4)] {
            app.grid.set_cell(index, crate::grid::Cell::Alive);
        }
        app.grid.toggle_running();

        // Two frames: no step yet. Third frame: one step.
        app.render_frame();
        app.render_frame();
        assert_eq!(app.grid.generation(), 0);
        app.render_frame();
        assert_eq!(app.grid.generation(), 1);
        app.render_frame();
        assert_eq!(app.grid.generation(), 1);
    }

    fn grid_index(grid: &Grid, x: usize, y: usize) -> usize {
        grid.index_of(x, y)
    }
}
