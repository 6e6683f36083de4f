//! # User Interface Module
//!
//! Dear ImGui integration and the panels of the application.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui context, winit platform glue and wgpu renderer
//! - [`panel`] - Selector, plot and render panels, drawn in that order every frame
//! - [`plot`] - Time-series plot builder used by the simulations
//!
//! ## Input Handling
//!
//! Window events go to ImGui first. Events the UI captures are not seen by the
//! rest of the application.

pub mod manager;
pub mod panel;
pub mod plot;

pub use manager::UiManager;
pub use panel::draw_panels;
pub use plot::{AxisLimits, TimePlot};
