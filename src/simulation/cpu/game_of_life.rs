//! Conway's Game of Life on a toroidal grid
//!
//! The grid is double-buffered: each step reads `cells`, writes `next` and swaps.
//! Every generation's live fraction is recorded against the accumulated simulated
//! time until the history is full.

use imgui::Ui;
use rand::{rngs::StdRng, Rng};

use super::{simulation_rng, PixelCanvas, StepClock, CANVAS_DISPLAY_SIZE, HISTORY_CAPACITY};
use crate::{
    gfx::Gfx,
    simulation::{
        error::{try_filled_vec, SimulationError},
        params::{draw_params, ParamSpec, Parameter},
        pixels::{BLACK, WHITE},
        time_series::{OverflowPolicy, TimeSeries},
        traits::{ParamsAction, Simulation},
    },
    ui::plot::TimePlot,
};

pub static PARAMS: [ParamSpec; 1] = [ParamSpec::int("Grid Size", 16, 128)];

pub const DEFAULT_GRID_SIZE: i32 = 64;

const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Survival on 2 or 3 neighbours, birth on exactly 3
pub fn next_state(alive: bool, neighbours: u8) -> bool {
    matches!((alive, neighbours), (true, 2) | (_, 3))
}

pub struct GameOfLife {
    grid_size: usize,
    /// Slider value; becomes `grid_size` on the next init
    pending_grid_size: i32,
    cells: Vec<u8>,
    next: Vec<u8>,
    live_fraction: f32,
    history: TimeSeries,
    clock: StepClock,
    canvas: Option<PixelCanvas>,
    seed: Option<u64>,
    rng: StdRng,
}

impl GameOfLife {
    pub fn new() -> Self {
        Self {
            grid_size: 0,
            pending_grid_size: DEFAULT_GRID_SIZE,
            cells: Vec::new(),
            next: Vec::new(),
            live_fraction: 0.0,
            history: TimeSeries::new(HISTORY_CAPACITY, OverflowPolicy::StopWhenFull),
            clock: StepClock::default(),
            canvas: None,
            seed: None,
            rng: simulation_rng(None),
        }
    }

    /// Fixes the random source so every init produces the same starting grid
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the grid size used by the next init
    pub fn with_grid_size(mut self, size: i32) -> Result<Self, SimulationError> {
        self.pending_grid_size = PARAMS[0].validate_int(size)?;
        Ok(self)
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn pending_grid_size(&self) -> i32 {
        self.pending_grid_size
    }

    pub fn set_pending_grid_size(&mut self, size: i32) {
        self.pending_grid_size = PARAMS[0].clamp_int(size);
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.grid_size + x
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        x < self.grid_size && y < self.grid_size && self.cells[self.index(x, y)] != 0
    }

    /// Sets one cell; coordinates outside the grid are ignored
    pub fn set_cell(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.grid_size && y < self.grid_size {
            let index = self.index(x, y);
            self.cells[index] = alive as u8;
            self.paint();
        }
    }

    /// Kills every cell
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.live_fraction = 0.0;
        self.paint();
    }

    /// Live cells among the 8 neighbours, wrapping at the edges
    pub fn live_neighbours(&self, x: usize, y: usize) -> u8 {
        let n = self.grid_size as isize;
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(dx, dy)| {
                let nx = (x as isize + dx).rem_euclid(n) as usize;
                let ny = (y as isize + dy).rem_euclid(n) as usize;
                self.cells[self.index(nx, ny)]
            })
            .sum()
    }

    /// Advances one generation and returns the new live fraction
    pub fn step(&mut self) -> f32 {
        let n = self.grid_size;
        if n == 0 {
            return 0.0;
        }

        let mut live = 0usize;
        for y in 0..n {
            for x in 0..n {
                let alive = self.cells[self.index(x, y)] != 0;
                let next = next_state(alive, self.live_neighbours(x, y));
                live += next as usize;
                self.next[y * n + x] = next as u8;
            }
        }
        std::mem::swap(&mut self.cells, &mut self.next);

        self.live_fraction = live as f32 / (n * n) as f32;
        self.paint();
        self.live_fraction
    }

    pub fn live_fraction(&self) -> f32 {
        self.live_fraction
    }

    pub fn history(&self) -> &TimeSeries {
        &self.history
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed
    }

    pub fn generation(&self) -> u64 {
        self.clock.step_count
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    fn randomize(&mut self) {
        let mut live = 0usize;
        for cell in self.cells.iter_mut() {
            let alive = self.rng.random_bool(0.5);
            *cell = alive as u8;
            live += alive as usize;
        }
        self.live_fraction = live as f32 / self.cells.len().max(1) as f32;
    }

    fn paint(&mut self) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let pixels = canvas.pixels_mut();
        for (index, &cell) in self.cells.iter().enumerate() {
            pixels.set_index(index, if cell != 0 { WHITE } else { BLACK });
        }
    }
}

impl Default for GameOfLife {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation for GameOfLife {
    fn name(&self) -> &str {
        "Game of Life"
    }

    fn init(&mut self, gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        let n = PARAMS[0].clamp_int(self.pending_grid_size) as usize;
        self.cells = try_filled_vec(n * n, 0u8, "life cells")?;
        self.next = try_filled_vec(n * n, 0u8, "life next generation")?;
        let mut canvas = PixelCanvas::new("Game of Life", n as u32, n as u32, BLACK)?;

        self.grid_size = n;
        self.history.clear();
        self.clock.reset();
        self.rng = simulation_rng(self.seed);
        self.randomize();

        canvas.attach(gfx);
        self.canvas = Some(canvas);
        self.paint();

        log::info!("Game of Life initialized with a {}x{} grid", n, n);
        Ok(())
    }

    fn destroy(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if let Some(canvas) = self.canvas.take() {
            canvas.release(gfx);
        }
        self.cells = Vec::new();
        self.next = Vec::new();
        self.grid_size = 0;
    }

    fn update(&mut self, delta_time: f32) {
        if self.grid_size == 0 {
            return;
        }
        let fraction = self.step();
        self.clock.record_step(delta_time);
        self.history.push(self.clock.elapsed, fraction);
    }

    fn params_ui(&mut self, ui: &Ui) -> ParamsAction {
        let mut params = [Parameter::int(&PARAMS[0], &mut self.pending_grid_size)];
        draw_params(ui, &mut params);

        if self.pending_grid_size as usize != self.grid_size {
            ui.text_disabled("Grid size applies on reset");
        }

        if ui.button("Reset") {
            ParamsAction::Reset
        } else {
            ParamsAction::None
        }
    }

    fn plot_ui(&mut self, ui: &Ui) {
        if self.history.len() < 2 {
            ui.text_disabled("Collecting samples...");
            return;
        }
        TimePlot::new("Live Ratio Over Time")
            .y_limits(0.0, 1.0)
            .line("Live ratio", &self.history, [0.9, 0.9, 0.9, 1.0])
            .build(ui);
    }

    fn render(&mut self, ui: &Ui, gfx: Option<&mut Gfx<'_>>) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.show(ui, gfx, CANVAS_DISPLAY_SIZE);
        }
        ui.text(format!("Live Ratio: {:.2}", self.live_fraction));
        ui.text(format!("Generation: {}", self.clock.step_count));
    }
}
