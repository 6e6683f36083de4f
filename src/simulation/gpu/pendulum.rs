//! Simple pendulum
//!
//! Integrated with semi-implicit Euler: the angular velocity is updated from the
//! current angle first and the new velocity then moves the angle. The rod is drawn
//! on the GPU into an offscreen target every frame.

use std::f32::consts::PI;

use cgmath::{Matrix2, Rad, Vector2};
use imgui::Ui;

use crate::{
    gfx::{
        line_renderer::{LineUniforms, TARGET_SIZE},
        Gfx, LineRenderer,
    },
    simulation::{
        error::SimulationError,
        params::{draw_params, ParamKind, ParamSpec, Parameter},
        time_series::{OverflowPolicy, TimeSeries},
        traits::{ParamsAction, Simulation},
    },
    ui::plot::TimePlot,
};

pub static PARAMS: [ParamSpec; 3] = [
    ParamSpec::float("Gravity", 1.0, 20.0),
    ParamSpec::float("Length", 0.5, 5.0),
    ParamSpec::float("Initial Angle", -PI, PI),
];

pub const DEFAULT_GRAVITY: f32 = 9.81;
pub const DEFAULT_LENGTH: f32 = 1.0;
pub const DEFAULT_INITIAL_ANGLE: f32 = 0.5;

/// Length of the rolling angle history
pub const HISTORY_CAPACITY: usize = 200;

fn max_length() -> f32 {
    match PARAMS[1].kind {
        ParamKind::Float { max, .. } => max,
        ParamKind::Int { max, .. } => max as f32,
    }
}

pub struct Pendulum {
    angle: f32,
    angular_velocity: f32,
    gravity: f32,
    length: f32,
    initial_angle: f32,
    elapsed: f32,
    history: TimeSeries,
    renderer: Option<LineRenderer>,
}

impl Pendulum {
    pub fn new() -> Self {
        Self {
            angle: DEFAULT_INITIAL_ANGLE,
            angular_velocity: 0.0,
            gravity: DEFAULT_GRAVITY,
            length: DEFAULT_LENGTH,
            initial_angle: DEFAULT_INITIAL_ANGLE,
            elapsed: 0.0,
            history: TimeSeries::new(HISTORY_CAPACITY, OverflowPolicy::Roll),
            renderer: None,
        }
    }

    /// Sets the angle the pendulum is released from on init and reset
    pub fn with_initial_angle(mut self, angle: f32) -> Self {
        self.initial_angle = PARAMS[2].clamp_float(angle);
        self.angle = self.initial_angle;
        self
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn history(&self) -> &TimeSeries {
        &self.history
    }

    /// Applies immediately, no reset needed
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = PARAMS[0].clamp_float(gravity);
    }

    /// Applies immediately, no reset needed
    pub fn set_length(&mut self, length: f32) {
        self.length = PARAMS[1].clamp_float(length);
    }

    /// Returns to the release angle at rest and forgets the history
    pub fn restart(&mut self) {
        self.angle = self.initial_angle;
        self.angular_velocity = 0.0;
        self.elapsed = 0.0;
        self.history.clear();
    }

    /// One integration step of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        // Values typed into the sliders can land outside their bounds
        self.gravity = PARAMS[0].clamp_float(self.gravity);
        self.length = PARAMS[1].clamp_float(self.length);

        let angular_acceleration = -(self.gravity / self.length) * self.angle.sin();
        self.angular_velocity += angular_acceleration * dt;
        self.angle += self.angular_velocity * dt;
    }

    /// Mechanical energy per unit mass, zero at rest at the bottom
    pub fn energy(&self) -> f32 {
        let kinetic = 0.5 * self.length * self.length * self.angular_velocity.powi(2);
        let potential = self.gravity * self.length * (1.0 - self.angle.cos());
        kinetic + potential
    }

    /// Bob position relative to the pivot, y pointing up
    pub fn bob_position(&self) -> Vector2<f32> {
        Matrix2::from_angle(Rad(self.angle)) * Vector2::new(0.0, -self.length)
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation for Pendulum {
    fn name(&self) -> &str {
        "Pendulum"
    }

    fn init(&mut self, gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        self.restart();
        if let Some(gfx) = gfx {
            self.renderer = Some(LineRenderer::new(gfx, "Pendulum"));
        }
        log::info!(
            "Pendulum initialized at {:.2} rad (g = {:.2}, L = {:.2})",
            self.angle,
            self.gravity,
            self.length
        );
        Ok(())
    }

    fn destroy(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if let (Some(renderer), Some(gfx)) = (self.renderer.take(), gfx) {
            renderer.release(gfx);
        }
    }

    fn update(&mut self, delta_time: f32) {
        self.step(delta_time);
        self.elapsed += delta_time;
        self.history.push(self.elapsed, self.angle);
    }

    fn params_ui(&mut self, ui: &Ui) -> ParamsAction {
        let [gravity_spec, length_spec, angle_spec] = &PARAMS;
        let mut params = [
            Parameter::float(gravity_spec, &mut self.gravity),
            Parameter::float(length_spec, &mut self.length),
            Parameter::float(angle_spec, &mut self.initial_angle),
        ];
        draw_params(ui, &mut params);

        // Restarting only touches CPU state, so the GPU resources are kept
        if ui.button("Reset") {
            log::info!("Pendulum restarted");
            self.restart();
        }

        ui.text(format!("Angle: {:.3} rad", self.angle));
        ui.text(format!("Angular velocity: {:.3} rad/s", self.angular_velocity));
        ui.text(format!("Energy: {:.3}", self.energy()));
        ParamsAction::None
    }

    fn plot_ui(&mut self, ui: &Ui) {
        if self.history.len() < 2 {
            ui.text_disabled("Collecting samples...");
            return;
        }
        TimePlot::new("Angle Over Time")
            .y_limits(-PI, PI)
            .line("Angle", &self.history, [0.9, 0.5, 1.0, 1.0])
            .build(ui);
    }

    fn render(&mut self, ui: &Ui, gfx: Option<&mut Gfx<'_>>) {
        match (self.renderer.as_mut(), gfx) {
            (Some(renderer), Some(gfx)) => {
                renderer.draw(
                    gfx,
                    LineUniforms::for_rod(self.angle, self.length, max_length()),
                );
                renderer.image(ui, [TARGET_SIZE as f32, TARGET_SIZE as f32]);
            }
            _ => ui.text_disabled("No GPU target available"),
        }

        let bob = self.bob_position();
        ui.text(format!("Bob: ({:.2}, {:.2})", bob.x, bob.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::ParamValue;

    #[test]
    fn test_rest_is_a_fixed_point() {
        let mut pendulum = Pendulum::new().with_initial_angle(0.0);
        pendulum.init(None).unwrap();
        for _ in 0..1_000 {
            pendulum.update(1.0 / 60.0);
        }
        assert_eq!(pendulum.angle(), 0.0);
        assert_eq!(pendulum.angular_velocity(), 0.0);
        assert_eq!(pendulum.energy(), 0.0);
    }

    #[test]
    fn test_velocity_is_updated_before_angle() {
        let mut pendulum = Pendulum::new().with_initial_angle(0.5);
        pendulum.init(None).unwrap();
        pendulum.step(0.1);
        let omega = -(DEFAULT_GRAVITY / DEFAULT_LENGTH) * 0.5f32.sin() * 0.1;
        assert_eq!(pendulum.angular_velocity(), omega);
        assert_eq!(pendulum.angle(), 0.5 + omega * 0.1);
    }

    #[test]
    fn test_energy_is_approximately_conserved() {
        let mut pendulum = Pendulum::new().with_initial_angle(0.5);
        pendulum.init(None).unwrap();
        let initial = pendulum.energy();

        let mut max_drift = 0.0f32;
        for _ in 0..600 {
            pendulum.update(1.0 / 60.0);
            max_drift = max_drift.max((pendulum.energy() - initial).abs());
        }
        assert!(max_drift > 0.0);
        assert!(max_drift / initial < 0.2, "drift {}", max_drift / initial);
    }

    #[test]
    fn test_history_rolls() {
        let mut pendulum = Pendulum::new();
        pendulum.init(None).unwrap();
        for _ in 0..HISTORY_CAPACITY + 50 {
            pendulum.update(0.01);
        }
        let history = pendulum.history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.last().map(|(_, angle)| angle), Some(pendulum.angle()));
        assert!(history.times()[0] > 0.5);
    }

    #[test]
    fn test_restart_matches_fresh_instance() {
        let mut fresh = Pendulum::new();
        fresh.init(None).unwrap();

        let mut used = Pendulum::new();
        used.init(None).unwrap();
        for _ in 0..30 {
            used.update(0.02);
        }
        used.restart();

        assert_eq!(used.angle(), fresh.angle());
        assert_eq!(used.angular_velocity(), 0.0);
        assert_eq!(used.elapsed(), 0.0);
        assert_eq!(used.history(), fresh.history());
    }

    #[test]
    fn test_live_parameters_are_clamped() {
        let mut pendulum = Pendulum::new();
        pendulum.set_gravity(100.0);
        pendulum.set_length(0.0);
        assert_eq!(pendulum.gravity(), 20.0);
        assert_eq!(pendulum.length(), 0.5);
    }

    #[test]
    fn test_bound_length_out_of_range_keeps_motion_finite() {
        let mut pendulum = Pendulum::new();
        {
            let mut params = [
                Parameter::float(&PARAMS[0], &mut pendulum.gravity),
                Parameter::float(&PARAMS[1], &mut pendulum.length),
            ];
            for param in params.iter_mut() {
                if let ParamValue::Float(value) = &mut param.value {
                    **value = 0.0;
                }
            }
        }
        pendulum.update(1.0 / 60.0);
        pendulum.update(1.0 / 60.0);
        assert_eq!(pendulum.length(), 0.5);
        assert_eq!(pendulum.gravity(), 1.0);
        assert!(pendulum.angle().is_finite());
        assert!(pendulum.angular_velocity().is_finite());
    }

    #[test]
    fn test_bob_position() {
        let pendulum = Pendulum::new().with_initial_angle(0.0);
        let bob = pendulum.bob_position();
        assert!(bob.x.abs() < 1e-6);
        assert!((bob.y + DEFAULT_LENGTH).abs() < 1e-6);

        let swung = Pendulum::new().with_initial_angle(PI / 2.0);
        let bob = swung.bob_position();
        assert!((bob.x - DEFAULT_LENGTH).abs() < 1e-6);
        assert!(bob.y.abs() < 1e-6);
    }
}
