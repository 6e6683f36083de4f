//! Monte Carlo estimate of π
//!
//! Each update draws one point uniformly from the unit square and classifies it
//! against the quarter unit disk. The ratio of inside points to all points, times
//! four, converges on π. Sampling stops once `max_points` points are stored.

use std::f32::consts::FRAC_PI_2;

use imgui::Ui;
use rand::{rngs::StdRng, Rng};

use super::{simulation_rng, PixelCanvas, StepClock, CANVAS_DISPLAY_SIZE};
use crate::{
    gfx::Gfx,
    simulation::{
        error::{try_with_capacity, SimulationError},
        params::{draw_params, ParamSpec, Parameter},
        pixels::PixelBuffer,
        time_series::{OverflowPolicy, TimeSeries},
        traits::{ParamsAction, Simulation},
    },
    ui::plot::TimePlot,
};

/// Upper bound on the number of stored points
pub const MAX_POINTS_CAP: usize = 10_000;
pub const DEFAULT_MAX_POINTS: i32 = 2_000;

pub static PARAMS: [ParamSpec; 1] = [ParamSpec::int("Max Points", 10, MAX_POINTS_CAP as i32)];

const CANVAS_SIZE: u32 = 256;
const BACKGROUND: [u8; 4] = [20, 20, 24, 255];
const ARC: [u8; 4] = [128, 128, 128, 255];
const INSIDE: [u8; 4] = [60, 200, 90, 255];
const OUTSIDE: [u8; 4] = [220, 60, 60, 255];

/// `4 * inside / total`, or `None` before the first sample
pub fn estimate(inside: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| 4.0 * inside as f64 / total as f64)
}

pub struct MonteCarloPi {
    max_points: usize,
    /// Slider value; becomes `max_points` on the next init
    pending_max_points: i32,
    points: Vec<[f32; 2]>,
    inside: Vec<bool>,
    inside_count: u64,
    estimates: TimeSeries,
    clock: StepClock,
    canvas: Option<PixelCanvas>,
    seed: Option<u64>,
    rng: StdRng,
}

impl MonteCarloPi {
    pub fn new() -> Self {
        Self {
            max_points: 0,
            pending_max_points: DEFAULT_MAX_POINTS,
            points: Vec::new(),
            inside: Vec::new(),
            inside_count: 0,
            estimates: TimeSeries::new(MAX_POINTS_CAP, OverflowPolicy::StopWhenFull),
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

    /// Sets the point budget used by the next init
    pub fn with_max_points(mut self, max_points: i32) -> Result<Self, SimulationError> {
        self.pending_max_points = PARAMS[0].validate_int(max_points)?;
        Ok(self)
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn set_pending_max_points(&mut self, max_points: i32) {
        self.pending_max_points = PARAMS[0].clamp_int(max_points);
    }

    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    pub fn inside_count(&self) -> u64 {
        self.inside_count
    }

    pub fn is_saturated(&self) -> bool {
        self.points.len() >= self.max_points
    }

    pub fn current_estimate(&self) -> Option<f64> {
        estimate(self.inside_count, self.points.len() as u64)
    }

    pub fn estimates(&self) -> &TimeSeries {
        &self.estimates
    }

    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    pub fn inside_flags(&self) -> &[bool] {
        &self.inside
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed
    }

    /// Stores one sample and records the new estimate. Returns false when saturated.
    pub fn add_point(&mut self, x: f32, y: f32, delta_time: f32) -> bool {
        if self.is_saturated() {
            return false;
        }

        let inside = x * x + y * y <= 1.0;
        self.points.push([x, y]);
        self.inside.push(inside);
        self.inside_count += inside as u64;
        self.clock.record_step(delta_time);

        if let Some(value) = self.current_estimate() {
            self.estimates.push(self.clock.elapsed, value as f32);
        }
        if let Some(canvas) = self.canvas.as_mut() {
            plot_point(canvas.pixels_mut(), x, y, inside);
        }
        true
    }
}

impl Default for MonteCarloPi {
    fn default() -> Self {
        Self::new()
    }
}

fn to_canvas(x: f32, y: f32) -> (u32, u32) {
    let max = (CANVAS_SIZE - 1) as f32;
    let px = (x.clamp(0.0, 1.0) * max).round() as u32;
    let py = ((1.0 - y.clamp(0.0, 1.0)) * max).round() as u32;
    (px, py)
}

fn plot_point(pixels: &mut PixelBuffer, x: f32, y: f32, inside: bool) {
    let (px, py) = to_canvas(x, y);
    pixels.set(px, py, if inside { INSIDE } else { OUTSIDE });
}

fn draw_background(pixels: &mut PixelBuffer) {
    pixels.fill(BACKGROUND);
    let steps = CANVAS_SIZE * 4;
    for i in 0..=steps {
        let theta = FRAC_PI_2 * i as f32 / steps as f32;
        let (px, py) = to_canvas(theta.cos(), theta.sin());
        pixels.set(px, py, ARC);
    }
}

impl Simulation for MonteCarloPi {
    fn name(&self) -> &str {
        "Monte Carlo Pi"
    }

    fn init(&mut self, gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        let max_points = PARAMS[0].clamp_int(self.pending_max_points) as usize;
        self.points = try_with_capacity(max_points, "monte carlo points")?;
        self.inside = try_with_capacity(max_points, "monte carlo flags")?;
        let mut canvas = PixelCanvas::new("Monte Carlo Pi", CANVAS_SIZE, CANVAS_SIZE, BACKGROUND)?;
        draw_background(canvas.pixels_mut());

        self.max_points = max_points;
        self.inside_count = 0;
        self.estimates.clear();
        self.clock.reset();
        self.rng = simulation_rng(self.seed);

        canvas.attach(gfx);
        self.canvas = Some(canvas);

        log::info!("Monte Carlo Pi initialized with {} points", max_points);
        Ok(())
    }

    fn destroy(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if let Some(canvas) = self.canvas.take() {
            canvas.release(gfx);
        }
        self.points = Vec::new();
        self.inside = Vec::new();
        self.max_points = 0;
    }

    fn update(&mut self, delta_time: f32) {
        if self.is_saturated() {
            return;
        }
        let x: f32 = self.rng.random();
        let y: f32 = self.rng.random();
        self.add_point(x, y, delta_time);
    }

    fn params_ui(&mut self, ui: &Ui) -> ParamsAction {
        let mut params = [Parameter::int(&PARAMS[0], &mut self.pending_max_points)];
        draw_params(ui, &mut params);

        if self.pending_max_points as usize != self.max_points {
            ui.text_disabled("Max points applies on reset");
        }

        if ui.button("Reset") {
            ParamsAction::Reset
        } else {
            ParamsAction::None
        }
    }

    fn plot_ui(&mut self, ui: &Ui) {
        if self.estimates.len() < 2 {
            ui.text_disabled("Collecting samples...");
            return;
        }
        TimePlot::new("Pi Estimate")
            .line("Estimate", &self.estimates, [0.3, 0.8, 1.0, 1.0])
            .reference("Pi", std::f32::consts::PI, [1.0, 0.8, 0.2, 1.0])
            .build(ui);
    }

    fn render(&mut self, ui: &Ui, gfx: Option<&mut Gfx<'_>>) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.show(ui, gfx, CANVAS_DISPLAY_SIZE);
        }
        ui.text(format!(
            "Points: {} / {}",
            self.points.len(),
            self.max_points
        ));
        ui.text(format!("Inside: {}", self.inside_count));
        match self.current_estimate() {
            Some(value) => {
                ui.text(format!("Estimate: {:.5}", value));
                ui.text(format!(
                    "Error: {:.5}",
                    (value - std::f64::consts::PI).abs()
                ));
            }
            None => ui.text("Estimate: -"),
        }
        if self.is_saturated() {
            ui.text_disabled("Saturated, reset to sample again");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(max_points: i32) -> MonteCarloPi {
        let mut mc = MonteCarloPi::new()
            .with_seed(5)
            .with_max_points(max_points)
            .unwrap();
        mc.init(None).unwrap();
        mc
    }

    #[test]
    fn test_first_inside_point_estimates_four() {
        let mut mc = sampler(10);
        assert_eq!(mc.current_estimate(), None);
        assert!(mc.add_point(0.1, 0.2, 0.016));
        assert_eq!(mc.current_estimate(), Some(4.0));
        assert_eq!(mc.estimates().values(), &[4.0]);
    }

    #[test]
    fn test_boundary_counts_as_inside() {
        let mut mc = sampler(10);
        mc.add_point(1.0, 0.0, 0.1);
        mc.add_point(0.0, 1.0, 0.1);
        mc.add_point(0.9, 0.9, 0.1);
        assert_eq!(mc.inside_flags(), &[true, true, false]);
        assert_eq!(mc.inside_count(), 2);
    }

    #[test]
    fn test_estimate_is_exact_ratio() {
        let mut mc = sampler(100);
        for _ in 0..37 {
            mc.update(0.01);
        }
        let k = mc.points_count() as u64;
        let m = mc.inside_count();
        assert_eq!(k, 37);
        assert_eq!(mc.current_estimate(), Some(4.0 * m as f64 / k as f64));
        assert_eq!(estimate(3, 4), Some(3.0));
    }

    #[test]
    fn test_saturation_stops_updates() {
        let mut mc = sampler(10);
        for _ in 0..10 {
            mc.update(0.1);
        }
        assert!(mc.is_saturated());
        let elapsed = mc.elapsed();
        let series = mc.estimates().clone();

        for _ in 0..5 {
            mc.update(0.1);
        }
        assert_eq!(mc.points_count(), 10);
        assert_eq!(mc.elapsed(), elapsed);
        assert_eq!(mc.estimates(), &series);
        assert!(!mc.add_point(0.0, 0.0, 0.1));
    }

    #[test]
    fn test_max_points_applies_on_reset() {
        let mut mc = sampler(10);
        mc.set_pending_max_points(50_000);
        assert_eq!(mc.max_points(), 10);
        mc.destroy(None);
        mc.init(None).unwrap();
        assert_eq!(mc.max_points(), MAX_POINTS_CAP);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let fresh = sampler(20);
        let mut used = sampler(20);
        for _ in 0..20 {
            used.update(0.05);
        }
        used.destroy(None);
        used.init(None).unwrap();
        assert_eq!(used.points_count(), fresh.points_count());
        assert_eq!(used.estimates(), fresh.estimates());
        assert_eq!(used.elapsed(), 0.0);
    }

    #[test]
    fn test_canvas_mapping() {
        assert_eq!(to_canvas(0.0, 0.0), (0, CANVAS_SIZE - 1));
        assert_eq!(to_canvas(1.0, 1.0), (CANVAS_SIZE - 1, 0));
        assert_eq!(to_canvas(2.0, -1.0), (CANVAS_SIZE - 1, CANVAS_SIZE - 1));
    }
}
