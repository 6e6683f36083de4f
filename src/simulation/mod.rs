//! Simulation system
//!
//! The [`Simulation`] trait, the static registry of built-in simulations, the host
//! that switches between them, and the shared building blocks (parameters, time
//! series, pixel buffers) the CPU and GPU simulations are made from.

pub mod cpu;
pub mod error;
pub mod gpu;
pub mod manager;
pub mod params;
pub mod pixels;
pub mod registry;
pub mod time_series;
pub mod traits;

pub use error::SimulationError;
pub use manager::{Lifecycle, SimulationHost};
pub use params::{ParamKind, ParamSpec, Parameter};
pub use registry::{
    BuiltinFactory, SimulationDescriptor, SimulationFactory, SimulationId, SimulationKind,
    SimulationRegistry,
};
pub use time_series::{OverflowPolicy, TimeSeries};
pub use traits::{ParamsAction, Simulation};
