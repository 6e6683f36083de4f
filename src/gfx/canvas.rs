//! Dynamic textures for CPU-rendered simulation images
//!
//! A [`CanvasTexture`] is a small RGBA texture registered with the ImGui renderer.
//! Simulations rebuild a [`PixelBuffer`] on the CPU and upload it here once per
//! frame; the render panel then shows it with [`CanvasTexture::image`].

use imgui::TextureId;
use imgui_wgpu::{Texture, TextureConfig};

use super::Gfx;
use crate::simulation::pixels::PixelBuffer;

/// Texel format used for every canvas
pub const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// An RGBA texture owned by one simulation and registered with ImGui
#[derive(Debug)]
pub struct CanvasTexture {
    texture_id: TextureId,
    width: u32,
    height: u32,
}

impl CanvasTexture {
    /// Creates a canvas with nearest filtering, so every cell stays a crisp square
    ///
    /// # Arguments
    /// * `gfx` - GPU handles lent by the host
    /// * `label` - Debug label for the texture
    /// * `width` - Width in texels
    /// * `height` - Height in texels
    pub fn new(gfx: &mut Gfx<'_>, label: &str, width: u32, height: u32) -> Self {
        let config = TextureConfig {
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            label: Some(label),
            format: Some(CANVAS_FORMAT),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            sampler_desc: wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            },
            ..Default::default()
        };

        let texture = Texture::new(gfx.device, gfx.renderer, config);
        let texture_id = gfx.renderer.textures.insert(texture);
        log::debug!("Created canvas '{}' ({}x{})", label, width, height);

        Self {
            texture_id,
            width,
            height,
        }
    }

    /// Uploads the pixel buffer. Buffers of a different size are skipped.
    pub fn upload(&self, gfx: &mut Gfx<'_>, pixels: &PixelBuffer) {
        if pixels.width() != self.width || pixels.height() != self.height {
            log::warn!(
                "Canvas size {}x{} does not match pixel buffer {}x{}",
                self.width,
                self.height,
                pixels.width(),
                pixels.height()
            );
            return;
        }

        if let Some(texture) = gfx.renderer.textures.get(self.texture_id) {
            texture.write(gfx.queue, pixels.as_bytes(), self.width, self.height);
        }
    }

    /// Draws the canvas as an ImGui image of the given on-screen size
    pub fn image(&self, ui: &imgui::Ui, size: [f32; 2]) {
        imgui::Image::new(self.texture_id, size).build(ui);
    }

    /// Unregisters the texture; the GPU memory is freed when the last handle drops
    pub fn release(self, gfx: &mut Gfx<'_>) {
        gfx.renderer.textures.remove(self.texture_id);
        log::debug!("Released canvas {:?}", self.texture_id);
    }
}
