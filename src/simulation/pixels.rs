//! CPU-side RGBA8 image that simulations draw into before upload

use super::error::{try_filled_vec, SimulationError};

pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Row-major RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocates a buffer filled with `color`
    pub fn new(width: u32, height: u32, color: [u8; 4]) -> Result<Self, SimulationError> {
        let texels = width as usize * height as usize;
        let mut data = try_filled_vec(texels * 4, 0u8, "pixel buffer")?;
        for texel in data.chunks_exact_mut(4) {
            texel.copy_from_slice(&color);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, 4 per texel, suitable for a texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Writes one texel; out-of-bounds writes are ignored
    pub fn set(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + 4].copy_from_slice(&color);
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut color = [0; 4];
        color.copy_from_slice(&self.data[offset..offset + 4]);
        Some(color)
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for texel in self.data.chunks_exact_mut(4) {
            texel.copy_from_slice(&color);
        }
    }

    /// Writes texel `index` (row-major) without bounds translation
    pub fn set_index(&mut self, index: usize, color: [u8; 4]) {
        if let Some(texel) = self.data.get_mut(index * 4..index * 4 + 4) {
            texel.copy_from_slice(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_color() {
        let pixels = PixelBuffer::new(4, 2, BLACK).unwrap();
        assert_eq!(pixels.as_bytes().len(), 4 * 2 * 4);
        assert_eq!(pixels.get(3, 1), Some(BLACK));
    }

    #[test]
    fn test_set_and_get() {
        let mut pixels = PixelBuffer::new(3, 3, BLACK).unwrap();
        pixels.set(1, 2, WHITE);
        assert_eq!(pixels.get(1, 2), Some(WHITE));
        assert_eq!(pixels.get(2, 1), Some(BLACK));
        pixels.set_index(0, [1, 2, 3, 4]);
        assert_eq!(pixels.get(0, 0), Some([1, 2, 3, 4]));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut pixels = PixelBuffer::new(2, 2, BLACK).unwrap();
        let before = pixels.clone();
        pixels.set(2, 0, WHITE);
        pixels.set_index(4, WHITE);
        assert_eq!(pixels, before);
        assert_eq!(pixels.get(0, 5), None);
    }
}
