//! Core simulation trait
//!
//! Defines the six-operation lifecycle every simulation implements so that the
//! host can drive any of them through the same calls.

use imgui::Ui;

use super::error::SimulationError;
use crate::gfx::Gfx;

/// Request returned by a simulation's parameter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamsAction {
    /// Nothing for the host to do
    #[default]
    None,
    /// Destroy and re-initialize the simulation, picking up pending parameters
    Reset,
}

/// Core trait for simulations driven by the host
///
/// The host guarantees the order `init`, then any number of `update` / UI /
/// `render` calls, then `destroy`. Every method except `name` has a no-op default,
/// so a simulation only implements what it needs.
///
/// Methods that may touch the GPU receive `Option<&mut Gfx>`; it is `None` when the
/// simulation runs headless (tests), and implementations must cope with that.
pub trait Simulation {
    /// Display name
    fn name(&self) -> &str;

    /// Allocate state and GPU resources
    ///
    /// Called when the simulation becomes active and again after each reset.
    ///
    /// # Arguments
    /// * `gfx` - GPU handles, or `None` when running without a window
    fn init(&mut self, _gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Release everything `init` created
    fn destroy(&mut self, _gfx: Option<&mut Gfx<'_>>) {}

    /// Advance the simulation
    ///
    /// # Arguments
    /// * `delta_time` - Time elapsed since last update in seconds (never negative)
    fn update(&mut self, _delta_time: f32) {}

    /// Parameter sliders and buttons
    fn params_ui(&mut self, _ui: &Ui) -> ParamsAction {
        ParamsAction::None
    }

    /// Time-series plots
    fn plot_ui(&mut self, _ui: &Ui) {}

    /// Visual output (image plus readouts)
    fn render(&mut self, _ui: &Ui, _gfx: Option<&mut Gfx<'_>>) {}
}
