use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::coords;
use crate::grid::Grid;

/// The two-entry cell palette.
const DEAD_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const ALIVE_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Background gray showing through the grid-line gaps.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.13,
    g: 0.13,
    b: 0.13,
    a: 1.0,
};

/// One visible cell as the GPU sees it: pixel rectangle plus fill color.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellInstance {
    /// x, y, width, height in window pixels.
    pub rect: [f32; 4],
    pub color: [f32; 4],
}

impl CellInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Window extent, for the pixel-to-NDC conversion in the vertex shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

/// Draw instructions for every cell visible under the camera.
///
/// Walks only the visible index ranges, not the whole grid, and emits one
/// colored rectangle per cell in them.
pub fn build_instances(grid: &Grid, camera: &Camera) -> Vec<CellInstance> {
    let (zoom, pan_x, pan_y) = (camera.zoom(), camera.pan_x(), camera.pan_y());
    let cols = coords::visible_range(pan_x, zoom, camera.window_width(), grid.width());
    let rows = coords::visible_range(pan_y, zoom, camera.window_height(), grid.height());

    let mut instances = Vec::with_capacity(cols.len() * rows.len());
    for y in rows {
        for x in cols.clone() {
            let index = grid.index_of(x, y);
            let rect = coords::cell_rect(index, zoom, pan_x, pan_y, grid.width());
            let color = if grid.cell(index).is_alive() {
                ALIVE_COLOR
            } else {
                DEAD_COLOR
            };
            instances.push(CellInstance {
                rect: [rect.x, rect.y, rect.w, rect.h],
                color,
            });
        }
    }
    instances
}

/// Draws the visible grid as instanced quads, one per cell.
pub struct Renderer {
    render_pipeline: wgpu::RenderPipeline,
    screen_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/cells.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Cell BGL"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cell Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[CellInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniform"),
            contents: bytemuck::bytes_of(&ScreenUniform {
                size: [1.0, 1.0],
                _pad: [0.0, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cell BG"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let instance_capacity = 4096;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Instances"),
            size: (instance_capacity * std::mem::size_of::<CellInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            render_pipeline,
            screen_buffer,
            bind_group,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
        }
    }

    /// Upload the window extent used for NDC conversion.
    pub fn update_screen(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        let uniform = ScreenUniform {
            size: [width as f32, height as f32],
            _pad: [0.0, 0.0],
        };
        queue.write_buffer(&self.screen_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Upload this frame's instances, growing the buffer when the visible
    /// set outgrows it.
    pub fn upload_instances(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[CellInstance],
    ) {
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Cell Instances"),
                size: (self.instance_capacity * std::mem::size_of::<CellInstance>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.instance_count = instances.len() as u32;
    }

    /// Encode a render pass that clears to the background gray and draws
    /// the uploaded instances.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cell Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::Cell;

    use super::*;

    #[test]
    fn instances_cover_exactly_the_visible_ranges() {
        let grid = Grid::new(10, 10).unwrap();
        let camera = Camera::new(100, 100, 10, 10, 25);
        // Fit zoom 10: all 10 columns and rows are visible.
        let instances = build_instances(&grid, &camera);
        assert_eq!(instances.len(), 100);
    }

    #[test]
    fn instances_use_the_two_entry_palette() {
        let mut grid = Grid::new(10, 10).unwrap();
        grid.set_cell(0, Cell::Alive);
        let camera = Camera::new(100, 100, 10, 10, 25);
        let instances = build_instances(&grid, &camera);
        assert_eq!(instances[0].color, ALIVE_COLOR);
        assert!(instances[1..].iter().all(|i| i.color == DEAD_COLOR));
    }

    #[test]
    fn instances_cull_cells_outside_the_viewport() {
        let grid = Grid::new(1000, 300).unwrap();
        let mut camera = Camera::new(800, 800, 1000, 300, 25);
        for _ in 0..100 {
            camera.zoom_in();
        }
        // At 32 px/cell an 800-pixel window shows 25 cells plus slack.
        let instances = build_instances(&grid, &camera);
        assert_eq!(instances.len(), 27 * 27);
    }

    #[test]
    fn instance_rects_follow_the_mapper() {
        let grid = Grid::new(10, 10).unwrap();
        let camera = Camera::new(100, 100, 10, 10, 25);
        let instances = build_instances(&grid, &camera);
        let expected = coords::cell_rect(0, camera.zoom(), 0.0, 0.0, 10);
        assert_eq!(instances[0].rect, [expected.x, expected.y, expected.w, expected.h]);
    }
}
