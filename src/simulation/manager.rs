//! Simulation host
//!
//! Owns the active selection and drives it through its lifecycle. Switching is
//! strictly ordered: the outgoing simulation is destroyed before the incoming one is
//! built and initialized, so at most one simulation is ever live.

use imgui::Ui;

use super::{
    error::SimulationError,
    registry::{
        BuiltinFactory, SimulationDescriptor, SimulationFactory, SimulationId, SimulationRegistry,
    },
    traits::{ParamsAction, Simulation},
};
use crate::gfx::Gfx;

/// Allowed range of the time scale multiplier
pub const TIME_SCALE_RANGE: (f32, f32) = (0.1, 3.0);
/// Allowed range of the fixed timestep in seconds
pub const FIXED_TIMESTEP_RANGE: (f32, f32) = (1.0 / 120.0, 1.0 / 30.0);

/// Where a simulation instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Active,
    Destroyed,
}

/// The selected registry entry and the instance built for it
pub struct ActiveSelection {
    descriptor: &'static SimulationDescriptor,
    simulation: Box<dyn Simulation>,
    lifecycle: Lifecycle,
}

impl ActiveSelection {
    fn new(descriptor: &'static SimulationDescriptor, simulation: Box<dyn Simulation>) -> Self {
        Self {
            descriptor,
            simulation,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    fn init(&mut self, gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        match self.simulation.init(gfx) {
            Ok(()) => {
                self.lifecycle = Lifecycle::Active;
                Ok(())
            }
            Err(err) => {
                // Whatever init managed to create is the simulation's to clean up
                self.lifecycle = Lifecycle::Destroyed;
                Err(err)
            }
        }
    }

    fn destroy(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if self.lifecycle == Lifecycle::Active {
            self.simulation.destroy(gfx);
        }
        self.lifecycle = Lifecycle::Destroyed;
    }

    pub fn descriptor(&self) -> &'static SimulationDescriptor {
        self.descriptor
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

/// Dispatches lifecycle calls to whichever simulation is selected
pub struct SimulationHost<F: SimulationFactory = BuiltinFactory> {
    registry: SimulationRegistry,
    factory: F,
    selection: ActiveSelection,
    last_error: Option<SimulationError>,
    is_paused: bool,
    time_scale: f32,
    accumulated_time: f32,
    fixed_timestep: Option<f32>,
}

impl SimulationHost<BuiltinFactory> {
    /// Host for the built-in simulations, starting on `None`
    pub fn new() -> Self {
        Self::with_factory(BuiltinFactory)
    }
}

impl Default for SimulationHost<BuiltinFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SimulationFactory> SimulationHost<F> {
    /// Creates a host that builds instances through `factory`. Nothing is
    /// initialized until [`start`](Self::start) is called.
    pub fn with_factory(factory: F) -> Self {
        let registry = SimulationRegistry::builtin();
        let descriptor = registry.descriptor(SimulationId::None);
        let simulation = factory.create(descriptor);
        Self {
            registry,
            factory,
            selection: ActiveSelection::new(descriptor, simulation),
            last_error: None,
            is_paused: false,
            time_scale: 1.0,
            accumulated_time: 0.0,
            fixed_timestep: None,
        }
    }

    /// Initializes the current selection if it has not been initialized yet
    pub fn start(&mut self, gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        if self.selection.lifecycle != Lifecycle::Uninitialized {
            return Ok(());
        }
        let result = self.selection.init(gfx);
        if let Err(err) = &result {
            log::error!(
                "Failed to start simulation '{}': {}",
                self.selection.descriptor.name,
                err
            );
            self.last_error = Some(err.clone());
        }
        result
    }

    /// Switches to the simulation with the given id
    ///
    /// The current simulation is destroyed first, then a fresh instance of `id` is
    /// built and initialized. Selecting the current id restarts it. If init fails the
    /// host falls back to `None` and returns the error.
    ///
    /// # Arguments
    /// * `id` - Simulation to activate
    /// * `gfx` - GPU handles, or `None` when running headless
    pub fn select(
        &mut self,
        id: SimulationId,
        mut gfx: Option<&mut Gfx<'_>>,
    ) -> Result<(), SimulationError> {
        let descriptor = self.registry.descriptor(id);
        log::info!(
            "Switching simulation '{}' -> '{}'",
            self.selection.descriptor.name,
            descriptor.name
        );

        self.selection.destroy(gfx.as_deref_mut());
        self.selection = ActiveSelection::new(descriptor, self.factory.create(descriptor));
        self.accumulated_time = 0.0;

        match self.selection.init(gfx.as_deref_mut()) {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to initialize '{}': {}", descriptor.name, err);
                self.last_error = Some(err.clone());
                self.fall_back_to_none(gfx);
                Err(err)
            }
        }
    }

    /// Switches by registry index, rejecting indices outside the table
    pub fn select_index(
        &mut self,
        index: usize,
        gfx: Option<&mut Gfx<'_>>,
    ) -> Result<(), SimulationError> {
        let id = self.registry.get(index)?.id;
        self.select(id, gfx)
    }

    /// Destroys and re-initializes the current instance, keeping its pending parameters
    pub fn reset(&mut self, mut gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
        let name = self.selection.descriptor.name;
        log::info!("Resetting simulation '{}'", name);

        self.selection.destroy(gfx.as_deref_mut());
        self.accumulated_time = 0.0;

        match self.selection.init(gfx.as_deref_mut()) {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to reset '{}': {}", name, err);
                self.last_error = Some(err.clone());
                self.fall_back_to_none(gfx);
                Err(err)
            }
        }
    }

    fn fall_back_to_none(&mut self, gfx: Option<&mut Gfx<'_>>) {
        let descriptor = self.registry.descriptor(SimulationId::None);
        self.selection = ActiveSelection::new(descriptor, self.factory.create(descriptor));
        if let Err(err) = self.selection.init(gfx) {
            log::error!("Placeholder simulation failed to initialize: {}", err);
        }
    }

    /// Advances the active simulation (called every frame)
    ///
    /// # Arguments
    /// * `delta_time` - Time elapsed since last frame in seconds
    pub fn update(&mut self, delta_time: f32) {
        if self.is_paused || self.selection.lifecycle != Lifecycle::Active {
            return;
        }

        let scaled_delta = delta_time.max(0.0) * self.time_scale;
        let simulation = &mut self.selection.simulation;

        if let Some(fixed_dt) = self.fixed_timestep {
            self.accumulated_time += scaled_delta;
            while self.accumulated_time >= fixed_dt {
                simulation.update(fixed_dt);
                self.accumulated_time -= fixed_dt;
            }
        } else {
            simulation.update(scaled_delta);
        }
    }

    /// Parameter controls of the active simulation
    pub fn params_ui(&mut self, ui: &Ui) -> ParamsAction {
        self.active_simulation_mut()
            .map_or(ParamsAction::None, |simulation| simulation.params_ui(ui))
    }

    /// Plots of the active simulation
    pub fn plot_ui(&mut self, ui: &Ui) {
        if let Some(simulation) = self.active_simulation_mut() {
            simulation.plot_ui(ui);
        }
    }

    /// Visual output of the active simulation
    pub fn render(&mut self, ui: &Ui, gfx: Option<&mut Gfx<'_>>) {
        if let Some(simulation) = self.active_simulation_mut() {
            simulation.render(ui, gfx);
        }
    }

    /// Destroys the active simulation; called once when the application exits
    pub fn shutdown(&mut self, gfx: Option<&mut Gfx<'_>>) {
        if self.selection.lifecycle == Lifecycle::Active {
            log::info!("Shutting down simulation '{}'", self.selection.descriptor.name);
        }
        self.selection.destroy(gfx);
    }

    /// The selected simulation, only while it is Active
    pub fn active_simulation_mut(&mut self) -> Option<&mut (dyn Simulation + '_)> {
        if self.selection.lifecycle == Lifecycle::Active {
            Some(self.selection.simulation.as_mut())
        } else {
            None
        }
    }

    pub fn registry(&self) -> &SimulationRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &ActiveSelection {
        &self.selection
    }

    pub fn current_id(&self) -> SimulationId {
        self.selection.descriptor.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.selection.lifecycle
    }

    /// Error from the last failed switch or reset, cleared by the next success
    pub fn last_error(&self) -> Option<&SimulationError> {
        self.last_error.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the time scale multiplier, clamped to [`TIME_SCALE_RANGE`]
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.clamp(TIME_SCALE_RANGE.0, TIME_SCALE_RANGE.1);
    }

    pub fn fixed_timestep(&self) -> Option<f32> {
        self.fixed_timestep
    }

    /// Enables fixed timestep mode, or variable timestep with `None`
    ///
    /// # Arguments
    /// * `timestep` - Fixed step in seconds, clamped to [`FIXED_TIMESTEP_RANGE`]
    pub fn set_fixed_timestep(&mut self, timestep: Option<f32>) {
        self.fixed_timestep =
            timestep.map(|dt| dt.clamp(FIXED_TIMESTEP_RANGE.0, FIXED_TIMESTEP_RANGE.1));
        self.accumulated_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Init(SimulationId),
        Destroy(SimulationId),
        Update(SimulationId, f32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct Recording {
        id: SimulationId,
        log: Log,
        fail_init: bool,
    }

    impl Simulation for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn init(&mut self, _gfx: Option<&mut Gfx<'_>>) -> Result<(), SimulationError> {
            self.log.borrow_mut().push(Event::Init(self.id));
            if self.fail_init {
                Err(SimulationError::Allocation {
                    what: "cells",
                    bytes: usize::MAX,
                })
            } else {
                Ok(())
            }
        }

        fn destroy(&mut self, _gfx: Option<&mut Gfx<'_>>) {
            self.log.borrow_mut().push(Event::Destroy(self.id));
        }

        fn update(&mut self, delta_time: f32) {
            self.log.borrow_mut().push(Event::Update(self.id, delta_time));
        }
    }

    struct RecordingFactory {
        log: Log,
        failing: Option<SimulationId>,
    }

    impl SimulationFactory for RecordingFactory {
        fn create(&self, descriptor: &SimulationDescriptor) -> Box<dyn Simulation> {
            Box::new(Recording {
                id: descriptor.id,
                log: self.log.clone(),
                fail_init: self.failing == Some(descriptor.id),
            })
        }
    }

    fn recording_host(failing: Option<SimulationId>) -> (SimulationHost<RecordingFactory>, Log) {
        let log: Log = Rc::default();
        let host = SimulationHost::with_factory(RecordingFactory {
            log: log.clone(),
            failing,
        });
        (host, log)
    }

    #[test]
    fn test_switch_destroys_before_init() {
        let (mut host, log) = recording_host(None);
        host.start(None).unwrap();
        host.select(SimulationId::GameOfLife, None).unwrap();
        host.select(SimulationId::Pendulum, None).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Init(SimulationId::None),
                Event::Destroy(SimulationId::None),
                Event::Init(SimulationId::GameOfLife),
                Event::Destroy(SimulationId::GameOfLife),
                Event::Init(SimulationId::Pendulum),
            ]
        );
        assert_eq!(host.current_id(), SimulationId::Pendulum);
        assert_eq!(host.lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_reselecting_restarts() {
        let (mut host, log) = recording_host(None);
        host.start(None).unwrap();
        host.select(SimulationId::Ising, None).unwrap();
        log.borrow_mut().clear();

        host.select(SimulationId::Ising, None).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Destroy(SimulationId::Ising),
                Event::Init(SimulationId::Ising)
            ]
        );
    }

    #[test]
    fn test_no_dispatch_outside_active() {
        let (mut host, log) = recording_host(None);
        assert_eq!(host.lifecycle(), Lifecycle::Uninitialized);
        host.update(0.1);
        assert!(host.active_simulation_mut().is_none());

        host.start(None).unwrap();
        host.shutdown(None);
        assert_eq!(host.lifecycle(), Lifecycle::Destroyed);
        host.update(0.1);
        host.shutdown(None);
        assert!(host.active_simulation_mut().is_none());

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Init(SimulationId::None),
                Event::Destroy(SimulationId::None)
            ]
        );
    }

    #[test]
    fn test_init_failure_reverts_to_none() {
        let (mut host, log) = recording_host(Some(SimulationId::MonteCarloPi));
        host.start(None).unwrap();
        let err = host.select(SimulationId::MonteCarloPi, None).unwrap_err();

        assert!(matches!(err, SimulationError::Allocation { .. }));
        assert_eq!(host.last_error(), Some(&err));
        assert_eq!(host.current_id(), SimulationId::None);
        assert_eq!(host.lifecycle(), Lifecycle::Active);
        // The failed instance is never destroyed or updated
        host.update(0.5);
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Init(SimulationId::None),
                Event::Destroy(SimulationId::None),
                Event::Init(SimulationId::MonteCarloPi),
                Event::Init(SimulationId::None),
                Event::Update(SimulationId::None, 0.5),
            ]
        );

        host.select(SimulationId::GameOfLife, None).unwrap();
        assert_eq!(host.last_error(), None);
    }

    #[test]
    fn test_select_index_out_of_range() {
        let (mut host, log) = recording_host(None);
        host.start(None).unwrap();
        assert_eq!(
            host.select_index(SimulationId::COUNT, None),
            Err(SimulationError::InvalidId(SimulationId::COUNT))
        );
        assert_eq!(host.current_id(), SimulationId::None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_reset_reuses_instance() {
        let (mut host, log) = recording_host(None);
        host.start(None).unwrap();
        host.select(SimulationId::GameOfLife, None).unwrap();
        log.borrow_mut().clear();

        host.reset(None).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Destroy(SimulationId::GameOfLife),
                Event::Init(SimulationId::GameOfLife)
            ]
        );
        assert_eq!(host.lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_pause_and_time_scale() {
        let (mut host, log) = recording_host(None);
        host.start(None).unwrap();
        log.borrow_mut().clear();

        host.set_paused(true);
        host.update(0.1);
        assert!(log.borrow().is_empty());

        host.set_paused(false);
        host.set_time_scale(2.0);
        host.update(0.1);
        assert_eq!(*log.borrow(), vec![Event::Update(SimulationId::None, 0.2)]);

        host.set_time_scale(10.0);
        assert_eq!(host.time_scale(), TIME_SCALE_RANGE.1);
    }

    #[test]
    fn test_fixed_timestep_accumulates() {
        let (mut host, log) = recording_host(None);
        host.start(None).unwrap();
        log.borrow_mut().clear();

        host.set_fixed_timestep(Some(0.025));
        host.update(0.06);
        let steps = log
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Update(_, dt) if *dt == 0.025))
            .count();
        assert_eq!(steps, 2);
        assert_eq!(log.borrow().len(), 2);

        host.set_fixed_timestep(Some(1.0));
        assert_eq!(host.fixed_timestep(), Some(FIXED_TIMESTEP_RANGE.1));
    }

    #[test]
    fn test_builtin_host_runs_headless() {
        let mut host = SimulationHost::new();
        host.start(None).unwrap();
        for id in SimulationId::ALL {
            host.select(id, None).unwrap();
            host.update(1.0 / 60.0);
            host.reset(None).unwrap();
            host.update(1.0 / 60.0);
        }
        host.shutdown(None);
        assert_eq!(host.lifecycle(), Lifecycle::Destroyed);
    }
}
