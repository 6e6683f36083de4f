//! # Graphics Module
//!
//! Everything that touches wgpu directly:
//!
//! - **Render Engine** ([`render_engine`]) - surface, device, queue and the per-frame pass
//! - **Canvas Textures** ([`canvas`]) - CPU pixel buffers shown as ImGui images
//! - **Line Renderer** ([`line_renderer`]) - offscreen pipeline used by the pendulum
//! - **Resources** ([`resources`]) - texture helpers shared by the above
//!
//! Simulations never see the render engine. They receive a [`Gfx`] for the duration
//! of a lifecycle call and use it to create, update and release their own resources.

pub mod canvas;
pub mod line_renderer;
pub mod render_engine;
pub mod resources;

pub use canvas::CanvasTexture;
pub use line_renderer::LineRenderer;
pub use render_engine::RenderEngine;

/// Borrowed GPU handles lent to a simulation during one call
///
/// The ImGui renderer is included because simulation images are registered in its
/// texture table.
pub struct Gfx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub renderer: &'a mut imgui_wgpu::Renderer,
}

impl<'a> Gfx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        renderer: &'a mut imgui_wgpu::Renderer,
    ) -> Self {
        Self {
            device,
            queue,
            renderer,
        }
    }
}
