//! Offscreen line renderer
//!
//! Renders a rod from a pivot to a tip, rotated and scaled on the GPU, into a
//! small colour target that ImGui shows as an image. The pendulum simulation is the
//! only user; it creates one in `init` and releases it in `destroy`.

use imgui::TextureId;
use imgui_wgpu::{Texture, TextureConfig};
use wgpu::util::DeviceExt;

use super::{canvas::CANVAS_FORMAT, resources::TextureResource, Gfx};
use crate::wgpu_utils::UniformBuffer;

/// Width and height of the offscreen target in pixels
pub const TARGET_SIZE: u32 = 256;

/// Rod vertex: `y` goes from 0 (pivot) to 1 (tip), `x` is a perpendicular offset
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Rod from pivot to bob in model space; the shader rotates and scales it
const ROD_VERTICES: [LineVertex; 2] = [
    LineVertex { position: [0.0, 0.0] },
    LineVertex { position: [0.0, 1.0] },
];

/// Uniform block matching `LineUniforms` in `line.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniforms {
    pub pivot: [f32; 2],
    pub angle: f32,
    pub length: f32,
}

impl LineUniforms {
    /// Maps a physical rod onto clip space so that `max_length` reaches 90% of the half-extent
    pub fn for_rod(angle: f32, length: f32, max_length: f32) -> Self {
        let scale = if max_length > 0.0 { 0.9 / max_length } else { 0.0 };
        Self {
            pivot: [0.0, 0.0],
            angle,
            length: length * scale,
        }
    }
}

/// Offscreen target, pipeline and buffers for drawing one rotated rod
pub struct LineRenderer {
    color_target: TextureId,
    depth_target: TextureResource,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniforms: UniformBuffer<LineUniforms>,
    bind_group: wgpu::BindGroup,
}

impl LineRenderer {
    /// Creates all GPU resources. The colour target is registered with ImGui last,
    /// so nothing needs unregistering if an earlier step panics.
    pub fn new(gfx: &mut Gfx<'_>, label: &str) -> Self {
        let device = gfx.device;

        let depth_target = TextureResource::create_depth_target(
            device,
            TARGET_SIZE,
            TARGET_SIZE,
            &format!("{} depth", label),
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("line.wgsl").into()),
        });

        let uniforms = UniformBuffer::new_with_data(device, &LineUniforms::for_rod(0.0, 0.0, 1.0));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Line Bind Group Layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Line Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding_resource(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[LineVertex::desc()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: CANVAS_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Vertex Buffer"),
            contents: bytemuck::cast_slice(&ROD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let color_texture = Texture::new(
            device,
            gfx.renderer,
            TextureConfig {
                size: TextureResource::extent(TARGET_SIZE, TARGET_SIZE),
                label: Some(label),
                format: Some(CANVAS_FORMAT),
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                ..Default::default()
            },
        );
        let color_target = gfx.renderer.textures.insert(color_texture);
        log::debug!("Created line renderer '{}'", label);

        Self {
            color_target,
            depth_target,
            pipeline,
            vertex_buffer,
            uniforms,
            bind_group,
        }
    }

    /// Clears the target and draws the rod with the given uniforms
    pub fn draw(&mut self, gfx: &mut Gfx<'_>, line: LineUniforms) {
        self.uniforms.update_content(gfx.queue, &line);

        let Some(color) = gfx.renderer.textures.get(self.color_target) else {
            log::warn!("Line renderer target {:?} is not registered", self.color_target);
            return;
        };

        let mut encoder = gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Line Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Line Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..ROD_VERTICES.len() as u32, 0..1);
        }

        gfx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Shows the last rendered frame as an ImGui image
    pub fn image(&self, ui: &imgui::Ui, size: [f32; 2]) {
        imgui::Image::new(self.color_target, size).build(ui);
    }

    /// Unregisters the colour target; remaining resources drop with `self`
    pub fn release(self, gfx: &mut Gfx<'_>) {
        gfx.renderer.textures.remove(self.color_target);
        log::debug!("Released line renderer {:?}", self.color_target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<LineUniforms>(), 16);
        assert_eq!(std::mem::size_of::<LineVertex>(), 8);
    }

    #[test]
    fn test_rod_scaling() {
        let line = LineUniforms::for_rod(0.3, 5.0, 5.0);
        assert_eq!(line.angle, 0.3);
        assert!((line.length - 0.9).abs() < 1e-6);

        let half = LineUniforms::for_rod(0.0, 2.5, 5.0);
        assert!((half.length - 0.45).abs() < 1e-6);

        assert_eq!(LineUniforms::for_rod(0.0, 1.0, 0.0).length, 0.0);
    }

    #[test]
    fn test_rod_is_a_single_pivot_to_bob_segment() {
        assert_eq!(ROD_VERTICES.len(), 2);
        assert_eq!(ROD_VERTICES[0].position, [0.0, 0.0]);
        assert_eq!(ROD_VERTICES[1].position, [0.0, 1.0]);
    }
}
