//! Placeholder selected at startup

use imgui::Ui;

use crate::{
    gfx::Gfx,
    simulation::traits::{ParamsAction, Simulation},
};

/// Does nothing and tolerates any call sequence
#[derive(Debug, Default)]
pub struct NoSimulation;

impl NoSimulation {
    pub fn new() -> Self {
        Self
    }
}

impl Simulation for NoSimulation {
    fn name(&self) -> &str {
        "None"
    }

    fn params_ui(&mut self, ui: &Ui) -> ParamsAction {
        ui.text_disabled("No parameters.");
        ParamsAction::None
    }

    fn plot_ui(&mut self, ui: &Ui) {
        ui.text("No plot.");
    }

    fn render(&mut self, ui: &Ui, _gfx: Option<&mut Gfx<'_>>) {
        ui.text("No simulation selected.");
        ui.text_disabled("No simulation render");
    }
}
