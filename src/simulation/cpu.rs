//! CPU simulation utilities and base types
//!
//! CPU simulations keep their state in plain vectors, repaint a [`PixelBuffer`]
//! after each step and let the render panel upload it. The helpers here cover the
//! parts they all share: step bookkeeping, the canvas and the random source.

pub mod game_of_life;
pub mod ising;
pub mod monte_carlo_pi;
pub mod none;

use imgui::Ui;
use rand::{rngs::StdRng, SeedableRng};

use super::{error::SimulationError, pixels::PixelBuffer};
use crate::gfx::{CanvasTexture, Gfx};

/// On-screen size of simulation images in the render panel
pub const CANVAS_DISPLAY_SIZE: [f32; 2] = [256.0, 256.0];

/// Capacity of the plotted history of the CPU simulations
pub const HISTORY_CAPACITY: usize = 600;

/// Step counter and accumulated simulated time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepClock {
    pub elapsed: f32,
    pub step_count: u64,
}

impl StepClock {
    /// Record a simulation step
    pub fn record_step(&mut self, delta_time: f32) {
        self.step_count += 1;
        self.elapsed += delta_time;
    }

    /// Average step length over the simulation's lifetime
    pub fn average_step(&self) -> f32 {
        if self.step_count > 0 {
            self.elapsed / self.step_count as f32
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Random source for one simulation run: fixed when a seed is given, otherwise
/// drawn from the thread RNG
pub fn simulation_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// A pixel buffer paired with the texture it is shown through
///
/// The texture only exists when the simulation was initialized with GPU handles;
/// headless runs keep painting into the buffer so state can still be inspected.
pub struct PixelCanvas {
    label: &'static str,
    pixels: PixelBuffer,
    texture: Option<CanvasTexture>,
    dirty: bool,
}

impl PixelCanvas {
    pub fn new(
        label: &'static str,
        width: u32,
        height: u32,
        color: [u8; 4],
    ) -> Result<Self, SimulationError> {
        Ok(Self {
            label,
            pixels: PixelBuffer::new(width, height, color)?,
            texture: None,
            dirty: true,
        })
    }

    /// Registers the texture. Call last in `init`, after every fallible step.
    pub fn attach(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if let Some(gfx) = gfx {
            self.texture = Some(CanvasTexture::new(
                gfx,
                self.label,
                self.pixels.width(),
                self.pixels.height(),
            ));
            self.dirty = true;
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Mutable access; marks the canvas for upload
    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        self.dirty = true;
        &mut self.pixels
    }

    /// Uploads pending changes and draws the image
    pub fn show(&mut self, ui: &Ui, gfx: Option<&mut Gfx<'_>>, size: [f32; 2]) {
        let Some(texture) = &self.texture else {
            ui.text_disabled("No texture available");
            return;
        };
        if self.dirty {
            if let Some(gfx) = gfx {
                texture.upload(gfx, &self.pixels);
                self.dirty = false;
            }
        }
        texture.image(ui, size);
    }

    /// Unregisters the texture, if any
    pub fn release(self, gfx: Option<&mut Gfx<'_>>) {
        if let (Some(texture), Some(gfx)) = (self.texture, gfx) {
            texture.release(gfx);
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::simulation::pixels::{BLACK, WHITE};

    #[test]
    fn test_step_clock() {
        let mut clock = StepClock::default();
        assert_eq!(clock.average_step(), 0.0);
        clock.record_step(0.5);
        clock.record_step(1.5);
        assert_eq!(clock.step_count, 2);
        assert_eq!(clock.elapsed, 2.0);
        assert_eq!(clock.average_step(), 1.0);
        clock.reset();
        assert_eq!(clock, StepClock::default());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = simulation_rng(Some(7));
        let mut b = simulation_rng(Some(7));
        for _ in 0..4 {
            assert_eq!(a.random::<u32>(), b.random::<u32>());
        }
    }

    #[test]
    fn test_headless_canvas() {
        let mut canvas = PixelCanvas::new("test", 4, 4, BLACK).unwrap();
        canvas.attach(None);
        assert!(!canvas.has_texture());
        canvas.pixels_mut().set(1, 1, WHITE);
        assert_eq!(canvas.pixels().get(1, 1), Some(WHITE));
        canvas.release(None);
    }
}
