//! The three application panels
//!
//! Drawn every frame in a fixed order: the selector (which also hosts the active
//! simulation's parameters), the plot and the render panel. Only the selector can
//! change which simulation is active.

use std::borrow::Cow;

use imgui::{Condition, Ui};

use crate::{
    gfx::Gfx,
    performance::FrameStats,
    simulation::{
        manager::{FIXED_TIMESTEP_RANGE, TIME_SCALE_RANGE},
        ParamsAction, SimulationFactory, SimulationHost, SimulationId,
    },
};

const MARGIN: f32 = 20.0;
const SELECTOR_WIDTH: f32 = 340.0;

/// Draws all panels in order
pub fn draw_panels<F: SimulationFactory>(
    ui: &Ui,
    host: &mut SimulationHost<F>,
    stats: &FrameStats,
    gfx: &mut Gfx<'_>,
) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    selector_panel(ui, host, stats, gfx);
    plot_panel(ui, host);
    render_panel(ui, host, gfx);
}

/// Simulation combo, run controls, frame stats and the active simulation's parameters
pub fn selector_panel<F: SimulationFactory>(
    ui: &Ui,
    host: &mut SimulationHost<F>,
    stats: &FrameStats,
    gfx: &mut Gfx<'_>,
) {
    let display_size = ui.io().display_size;
    let panel_height = (display_size[1] - 2.0 * MARGIN).max(300.0);

    ui.window("Simulation Selector")
        .size([SELECTOR_WIDTH, panel_height], Condition::FirstUseEver)
        .position([MARGIN, MARGIN], Condition::FirstUseEver)
        .resizable(true)
        .build(|| {
            render_simulation_combo(ui, host, gfx);

            if let Some(err) = host.last_error() {
                ui.text_colored([1.0, 0.4, 0.4, 1.0], format!("Error: {}", err));
            }

            ui.separator();
            render_run_controls(ui, host);

            ui.separator();
            stats.render_ui(ui);

            ui.separator();
            ui.text("Parameters");
            if host.params_ui(ui) == ParamsAction::Reset {
                // Failures are logged by the host and shown above on the next frame
                let _ = host.reset(Some(&mut *gfx));
            }
        });
}

fn render_simulation_combo<F: SimulationFactory>(
    ui: &Ui,
    host: &mut SimulationHost<F>,
    gfx: &mut Gfx<'_>,
) {
    let names = host.registry().names();
    let mut index = host.current_id().index();

    if ui.combo("Simulation", &mut index, &names, |name| Cow::Borrowed(*name)) {
        match SimulationId::from_index(index) {
            Ok(id) => {
                let _ = host.select(id, Some(&mut *gfx));
            }
            Err(err) => log::warn!("Ignoring selection: {}", err),
        }
    }

    if ui.button("Restart") {
        let id = host.current_id();
        let _ = host.select(id, Some(&mut *gfx));
    }
}

fn render_run_controls<F: SimulationFactory>(ui: &Ui, host: &mut SimulationHost<F>) {
    let label = if host.is_paused() { "Play" } else { "Pause" };
    if ui.button(label) {
        host.set_paused(!host.is_paused());
    }

    let mut time_scale = host.time_scale();
    if ui.slider(
        "Time Scale",
        TIME_SCALE_RANGE.0,
        TIME_SCALE_RANGE.1,
        &mut time_scale,
    ) {
        host.set_time_scale(time_scale);
    }

    let mut use_fixed_timestep = host.fixed_timestep().is_some();
    if ui.checkbox("Fixed Timestep", &mut use_fixed_timestep) {
        host.set_fixed_timestep(use_fixed_timestep.then_some(1.0 / 60.0));
    }

    if let Some(mut fixed_dt) = host.fixed_timestep() {
        if ui.slider(
            "Fixed DT",
            FIXED_TIMESTEP_RANGE.0,
            FIXED_TIMESTEP_RANGE.1,
            &mut fixed_dt,
        ) {
            host.set_fixed_timestep(Some(fixed_dt));
        }
    }
}

/// Time-series plots of the active simulation
pub fn plot_panel<F: SimulationFactory>(ui: &Ui, host: &mut SimulationHost<F>) {
    let display_size = ui.io().display_size;
    let x = SELECTOR_WIDTH + 2.0 * MARGIN;
    let width = (display_size[0] - x - MARGIN).max(300.0);

    ui.window("Simulation Plot")
        .size([width, 280.0], Condition::FirstUseEver)
        .position([x, MARGIN], Condition::FirstUseEver)
        .resizable(true)
        .build(|| host.plot_ui(ui));
}

/// Visual output of the active simulation
pub fn render_panel<F: SimulationFactory>(
    ui: &Ui,
    host: &mut SimulationHost<F>,
    gfx: &mut Gfx<'_>,
) {
    let x = SELECTOR_WIDTH + 2.0 * MARGIN;

    ui.window("Simulation Render")
        .size([300.0, 380.0], Condition::FirstUseEver)
        .position([x, 280.0 + 2.0 * MARGIN], Condition::FirstUseEver)
        .resizable(true)
        .build(|| host.render(ui, Some(&mut *gfx)));
}
