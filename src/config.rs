//! Application configuration
//!
//! Static startup settings for the window, the UI and the frame loop. There is no
//! file or command line surface; callers adjust the defaults with the `with_*`
//! setters before handing the config to [`SimDeckApp::new`].
//!
//! [`SimDeckApp::new`]: crate::app::SimDeckApp::new

use crate::simulation::SimulationId;

/// Startup configuration for [`SimDeckApp`](crate::app::SimDeckApp)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Window title
    pub title: String,
    /// Initial inner window width in logical pixels
    pub width: u32,
    /// Initial inner window height in logical pixels
    pub height: u32,
    /// Background colour behind the UI panels (RGBA, 0..1)
    pub clear_color: [f64; 4],
    /// Simulation selected when the application starts
    pub initial_simulation: SimulationId,
    /// ImGui font size in pixels
    pub font_size: f32,
    /// Present with vsync (Fifo) instead of the fastest available mode
    pub vsync: bool,
    /// Upper bound for a single frame's delta time in seconds
    pub max_frame_dt: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "SimDeck".to_string(),
            width: 800,
            height: 600,
            clear_color: [0.0, 0.2, 0.5, 1.0],
            initial_simulation: SimulationId::None,
            font_size: 18.0,
            vsync: true,
            max_frame_dt: 0.25,
        }
    }
}

impl AppConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial window size; zero dimensions are raised to one pixel
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_clear_color(mut self, clear_color: [f64; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_initial_simulation(mut self, id: SimulationId) -> Self {
        self.initial_simulation = id;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size.max(6.0);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Sets the frame delta clamp; negative values are treated as zero
    pub fn with_max_frame_dt(mut self, max_frame_dt: f32) -> Self {
        self.max_frame_dt = max_frame_dt.max(0.0);
        self
    }

    /// Clear colour in the form the render pass expects
    pub fn wgpu_clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.initial_simulation, SimulationId::None);
        assert!(!config.title.is_empty());
        assert!(config.max_frame_dt > 0.0);
    }

    #[test]
    fn test_builder_setters() {
        let config = AppConfig::default()
            .with_title("Pendulum Lab")
            .with_size(0, 480)
            .with_initial_simulation(SimulationId::Pendulum)
            .with_max_frame_dt(-1.0);

        assert_eq!(config.title, "Pendulum Lab");
        assert_eq!(config.width, 1);
        assert_eq!(config.height, 480);
        assert_eq!(config.initial_simulation, SimulationId::Pendulum);
        assert_eq!(config.max_frame_dt, 0.0);
    }

    #[test]
    fn test_clear_color_conversion() {
        let color = AppConfig::default().wgpu_clear_color();
        assert_eq!(color.r, 0.0);
        assert_eq!(color.g, 0.2);
        assert_eq!(color.b, 0.5);
        assert_eq!(color.a, 1.0);
    }
}
