// src/lib.rs
//! SimDeck
//!
//! An interactive harness for small simulations built on wgpu, winit and Dear ImGui.
//! A registry lists the available simulations; the host runs exactly one of them
//! at a time and draws its parameter, plot and render panels every frame.

pub mod app;
pub mod config;
pub mod gfx;
pub mod performance;
pub mod simulation;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::SimDeckApp;
pub use config::AppConfig;
pub use simulation::{SimulationError, SimulationId};

/// Creates an application with the default configuration
pub fn default() -> anyhow::Result<SimDeckApp> {
    SimDeckApp::new(AppConfig::default())
}
