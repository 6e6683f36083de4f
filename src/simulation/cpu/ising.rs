//! 2D Ising model with Metropolis dynamics
//!
//! An L x L lattice of +1/-1 spins with periodic boundaries and coupling J = 1.
//! Each update performs one sweep of L² single-spin flip attempts at the current
//! temperature and records energy and magnetisation per spin.

use imgui::Ui;
use rand::{rngs::StdRng, Rng};

use super::{simulation_rng, PixelCanvas, StepClock, CANVAS_DISPLAY_SIZE, HISTORY_CAPACITY};
use crate::{
    gfx::Gfx,
    simulation::{
        error::{try_filled_vec, SimulationError},
        params::{draw_params, ParamSpec, Parameter},
        pixels::BLACK,
        time_series::{OverflowPolicy, TimeSeries},
        traits::{ParamsAction, Simulation},
    },
    ui::plot::TimePlot,
};

pub static PARAMS: [ParamSpec; 2] = [
    ParamSpec::int("Lattice Size", 16, 128),
    ParamSpec::float("Temperature", 0.5, 5.0),
];

pub const DEFAULT_LATTICE_SIZE: i32 = 64;
pub const DEFAULT_TEMPERATURE: f32 = 2.5;

const SPIN_UP: [u8; 4] = [220, 60, 60, 255];
const SPIN_DOWN: [u8; 4] = [60, 90, 220, 255];

pub struct IsingModel {
    size: usize,
    pending_size: i32,
    temperature: f32,
    spins: Vec<i8>,
    energy: TimeSeries,
    magnetization: TimeSeries,
    clock: StepClock,
    canvas: Option<PixelCanvas>,
    seed: Option<u64>,
    rng: StdRng,
}

impl IsingModel {
    pub fn new() -> Self {
        Self {
            size: 0,
            pending_size: DEFAULT_LATTICE_SIZE,
            temperature: DEFAULT_TEMPERATURE,
            spins: Vec::new(),
            energy: TimeSeries::new(HISTORY_CAPACITY, OverflowPolicy::StopWhenFull),
            magnetization: TimeSeries::new(HISTORY_CAPACITY, OverflowPolicy::StopWhenFull),
            clock: StepClock::default(),
            canvas: None,
            seed: None,
            rng: simulation_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the lattice size used by the next init
    pub fn with_size(mut self, size: i32) -> Result<Self, SimulationError> {
        self.pending_size = PARAMS[0].validate_int(size)?;
        Ok(self)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Takes effect on the next sweep
    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = PARAMS[1].clamp_float(temperature);
    }

    /// Spin at `(x, y)`, or `None` outside the lattice
    pub fn spin(&self, x: usize, y: usize) -> Option<i8> {
        (x < self.size && y < self.size).then(|| self.spins[self.index(x, y)])
    }

    /// Aligns every spin with `spin` (+1 or -1)
    pub fn set_uniform(&mut self, spin: i8) {
        let spin = if spin >= 0 { 1 } else { -1 };
        self.spins.fill(spin);
        self.paint();
    }

    pub fn set_spin(&mut self, x: usize, y: usize, spin: i8) {
        if x < self.size && y < self.size {
            let index = self.index(x, y);
            self.spins[index] = if spin >= 0 { 1 } else { -1 };
            self.paint();
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    fn wrapped(&self, x: usize, y: usize, dx: isize, dy: isize) -> i32 {
        let n = self.size as isize;
        let nx = (x as isize + dx).rem_euclid(n) as usize;
        let ny = (y as isize + dy).rem_euclid(n) as usize;
        self.spins[self.index(nx, ny)] as i32
    }

    /// Energy change caused by flipping the spin at `(x, y)`
    pub fn flip_energy(&self, x: usize, y: usize) -> i32 {
        let neighbours = self.wrapped(x, y, 1, 0)
            + self.wrapped(x, y, -1, 0)
            + self.wrapped(x, y, 0, 1)
            + self.wrapped(x, y, 0, -1);
        2 * self.spins[self.index(x, y)] as i32 * neighbours
    }

    /// One Metropolis sweep of L² random flip attempts; returns the accepted count
    pub fn sweep(&mut self) -> usize {
        let n = self.size;
        if n == 0 {
            return 0;
        }

        // Values typed into the slider can land outside its bounds
        self.temperature = PARAMS[1].clamp_float(self.temperature);

        let mut accepted = 0;
        for _ in 0..n * n {
            let x = self.rng.random_range(0..n);
            let y = self.rng.random_range(0..n);
            let delta = self.flip_energy(x, y);
            let accept = delta <= 0
                || self.rng.random::<f32>() < (-(delta as f32) / self.temperature).exp();
            if accept {
                let index = self.index(x, y);
                self.spins[index] = -self.spins[index];
                accepted += 1;
            }
        }

        self.paint();
        accepted
    }

    /// Energy per spin, counting each bond once via the right and down neighbours
    pub fn energy_per_spin(&self) -> f32 {
        let n = self.size;
        if n == 0 {
            return 0.0;
        }
        let mut energy = 0i64;
        for y in 0..n {
            for x in 0..n {
                let s = self.spins[self.index(x, y)] as i32;
                energy -= (s * (self.wrapped(x, y, 1, 0) + self.wrapped(x, y, 0, 1))) as i64;
            }
        }
        energy as f32 / (n * n) as f32
    }

    pub fn magnetization_per_spin(&self) -> f32 {
        if self.spins.is_empty() {
            return 0.0;
        }
        let total: i64 = self.spins.iter().map(|&s| s as i64).sum();
        total as f32 / self.spins.len() as f32
    }

    pub fn energy_history(&self) -> &TimeSeries {
        &self.energy
    }

    pub fn magnetization_history(&self) -> &TimeSeries {
        &self.magnetization
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed
    }

    pub fn spins(&self) -> &[i8] {
        &self.spins
    }

    fn paint(&mut self) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let pixels = canvas.pixels_mut();
        for (index, &spin) in self.spins.iter().enumerate() {
            pixels.set_index(index, if spin > 0 { SPIN_UP } else { SPIN_DOWN });
        }
    }
}

impl Default for IsingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation for IsingModel {
    fn name(&self) -> &str {
        "Ising Model"
    }

    fn init(&mut self, gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        let n = PARAMS[0].clamp_int(self.pending_size) as usize;
        let mut spins = try_filled_vec(n * n, 1i8, "ising lattice")?;
        let mut canvas = PixelCanvas::new("Ising Model", n as u32, n as u32, BLACK)?;

        self.rng = simulation_rng(self.seed);
        for spin in spins.iter_mut() {
            *spin = if self.rng.random_bool(0.5) { 1 } else { -1 };
        }
        self.spins = spins;
        self.size = n;
        self.energy.clear();
        self.magnetization.clear();
        self.clock.reset();

        canvas.attach(gfx);
        self.canvas = Some(canvas);
        self.paint();

        log::info!(
            "Ising model initialized with a {}x{} lattice at T = {:.2}",
            n,
            n,
            self.temperature
        );
        Ok(())
    }

    fn destroy(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if let Some(canvas) = self.canvas.take() {
            canvas.release(gfx);
        }
        self.spins = Vec::new();
        self.size = 0;
    }

    fn update(&mut self, delta_time: f32) {
        if self.size == 0 {
            return;
        }
        self.sweep();
        self.clock.record_step(delta_time);
        let time = self.clock.elapsed;
        self.energy.push(time, self.energy_per_spin());
        self.magnetization.push(time, self.magnetization_per_spin());
    }

    fn params_ui(&mut self, ui: &Ui) -> ParamsAction {
        let [size_spec, temperature_spec] = &PARAMS;
        let mut params = [
            Parameter::int(size_spec, &mut self.pending_size),
            Parameter::float(temperature_spec, &mut self.temperature),
        ];
        draw_params(ui, &mut params);

        if self.pending_size as usize != self.size {
            ui.text_disabled("Lattice size applies on reset");
        }

        if ui.button("Reset") {
            ParamsAction::Reset
        } else {
            ParamsAction::None
        }
    }

    fn plot_ui(&mut self, ui: &Ui) {
        if self.energy.len() < 2 {
            ui.text_disabled("Collecting samples...");
            return;
        }
        TimePlot::new("Energy and Magnetisation per Spin")
            .y_limits(-2.5, 2.5)
            .line("Energy", &self.energy, [1.0, 0.6, 0.2, 1.0])
            .line("Magnetisation", &self.magnetization, [0.4, 0.8, 1.0, 1.0])
            .build(ui);
    }

    fn render(&mut self, ui: &Ui, gfx: Option<&mut Gfx<'_>>) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.show(ui, gfx, CANVAS_DISPLAY_SIZE);
        }
        ui.text(format!("Energy: {:.3}", self.energy_per_spin()));
        ui.text(format!("Magnetisation: {:.3}", self.magnetization_per_spin()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::ParamValue;

    fn lattice(size: i32) -> IsingModel {
        let mut model = IsingModel::new().with_seed(11).with_size(size).unwrap();
        model.init(None).unwrap();
        model
    }

    #[test]
    fn test_uniform_lattice_observables() {
        let mut model = lattice(16);
        model.set_uniform(1);
        assert_eq!(model.energy_per_spin(), -2.0);
        assert_eq!(model.magnetization_per_spin(), 1.0);

        model.set_uniform(-1);
        assert_eq!(model.energy_per_spin(), -2.0);
        assert_eq!(model.magnetization_per_spin(), -1.0);
    }

    #[test]
    fn test_flip_energy() {
        let mut model = lattice(16);
        model.set_uniform(1);
        assert_eq!(model.flip_energy(0, 0), 8);

        // A lone flipped spin gains energy back when flipped again
        model.set_spin(5, 5, -1);
        assert_eq!(model.flip_energy(5, 5), -8);
        assert_eq!(model.flip_energy(5, 6), 4);
    }

    #[test]
    fn test_checkerboard_is_maximal_energy() {
        let mut model = lattice(16);
        for y in 0..16 {
            for x in 0..16 {
                model.set_spin(x, y, if (x + y) % 2 == 0 { 1 } else { -1 });
            }
        }
        assert_eq!(model.energy_per_spin(), 2.0);
        assert_eq!(model.magnetization_per_spin(), 0.0);
    }

    #[test]
    fn test_cold_lattice_relaxes_isolated_spin() {
        let mut model = lattice(16);
        model.set_temperature(0.5);
        model.set_uniform(1);
        model.set_spin(3, 3, -1);
        // Flipping the odd spin back always lowers the energy, so enough sweeps undo it
        for _ in 0..20 {
            model.sweep();
            if model.spin(3, 3) == Some(1) {
                break;
            }
        }
        assert_eq!(model.spin(3, 3), Some(1));
        assert!(model.magnetization_per_spin() > 0.9);
    }

    #[test]
    fn test_update_records_both_series() {
        let mut model = lattice(16);
        model.update(0.25);
        model.update(0.25);
        assert_eq!(model.energy_history().len(), 2);
        assert_eq!(model.magnetization_history().len(), 2);
        assert_eq!(model.energy_history().last().map(|(t, _)| t), Some(0.5));
        let (lo, hi) = model.energy_history().value_range().unwrap();
        assert!(lo >= -2.0 && hi <= 2.0);
    }

    #[test]
    fn test_spin_outside_lattice() {
        assert_eq!(IsingModel::new().spin(0, 0), None);

        let mut model = lattice(16);
        model.set_uniform(-1);
        assert_eq!(model.spin(15, 15), Some(-1));
        assert_eq!(model.spin(16, 0), None);
        assert_eq!(model.spin(0, 16), None);
    }

    #[test]
    fn test_bound_temperature_out_of_range_is_pulled_back() {
        let mut model = lattice(16);
        {
            let mut params = [Parameter::float(&PARAMS[1], &mut model.temperature)];
            if let ParamValue::Float(value) = &mut params[0].value {
                **value = 0.0;
            }
        }
        model.update(0.1);
        assert_eq!(model.temperature(), 0.5);
        let (lo, hi) = model.energy_history().value_range().unwrap();
        assert!(lo.is_finite() && hi.is_finite());
    }

    #[test]
    fn test_temperature_is_clamped() {
        let mut model = IsingModel::new();
        model.set_temperature(0.0);
        assert_eq!(model.temperature(), 0.5);
        model.set_temperature(9.0);
        assert_eq!(model.temperature(), 5.0);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let mut fresh = lattice(32);
        let mut used = lattice(32);
        used.update(0.1);
        used.destroy(None);
        used.init(None).unwrap();
        assert_eq!(used.spins(), fresh.spins());
        assert_eq!(used.elapsed(), 0.0);
        assert_eq!(used.energy_history(), fresh.energy_history());
        fresh.destroy(None);
    }
}
