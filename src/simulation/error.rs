//! Error types for the simulation layer

use thiserror::Error;

/// Failures surfaced by the registry, the host and simulation `init`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Registry lookup outside `0..SimulationId::COUNT`
    #[error("invalid simulation identifier {0}")]
    InvalidId(usize),

    /// A buffer could not be reserved while initializing a simulation
    #[error("failed to allocate {what} ({bytes} bytes)")]
    Allocation { what: &'static str, bytes: usize },

    /// A parameter value outside the bounds declared for it
    #[error("parameter '{name}' out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Allocates a vector of `len` copies of `value`, reporting failure instead of aborting
pub fn try_filled_vec<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> Result<Vec<T>, SimulationError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| SimulationError::Allocation {
            what,
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    data.resize(len, value);
    Ok(data)
}

/// Allocates an empty vector able to hold `capacity` items without reallocating
pub fn try_with_capacity<T>(capacity: usize, what: &'static str) -> Result<Vec<T>, SimulationError> {
    let mut data = Vec::new();
    data.try_reserve_exact(capacity)
        .map_err(|_| SimulationError::Allocation {
            what,
            bytes: capacity.saturating_mul(std::mem::size_of::<T>()),
        })?;
    Ok(data)
}
