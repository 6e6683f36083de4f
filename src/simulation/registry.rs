//! Simulation registry
//!
//! An ordered, immutable table of every simulation the application offers. The
//! order of [`DESCRIPTORS`] is the order shown in the selector combo box.

use super::{
    cpu::{game_of_life, ising, monte_carlo_pi, none::NoSimulation},
    error::SimulationError,
    gpu::pendulum,
    params::ParamSpec,
    traits::Simulation,
};

/// Identifier of a registered simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimulationId {
    #[default]
    None,
    GameOfLife,
    MonteCarloPi,
    Pendulum,
    Ising,
}

impl SimulationId {
    /// Number of registered simulations
    pub const COUNT: usize = 5;

    /// Every identifier in registry order
    pub const ALL: [SimulationId; Self::COUNT] = [
        SimulationId::None,
        SimulationId::GameOfLife,
        SimulationId::MonteCarloPi,
        SimulationId::Pendulum,
        SimulationId::Ising,
    ];

    /// Position in the registry
    pub fn index(self) -> usize {
        self as usize
    }

    /// Identifier at `index`, failing for anything outside `0..COUNT`
    pub fn from_index(index: usize) -> Result<Self, SimulationError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SimulationError::InvalidId(index))
    }
}

/// How a simulation produces its picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationKind {
    /// Does nothing; the default selection
    Placeholder,
    /// Builds a pixel buffer on the CPU and uploads it every frame
    Cpu,
    /// Owns a render pipeline and draws offscreen
    Gpu,
}

/// Registry entry: identity and metadata of one simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationDescriptor {
    pub id: SimulationId,
    pub name: &'static str,
    pub kind: SimulationKind,
    pub params: &'static [ParamSpec],
}

impl SimulationDescriptor {
    /// Builds a fresh, uninitialized instance of this simulation
    pub fn instantiate(&self) -> Box<dyn Simulation> {
        match self.id {
            SimulationId::None => Box::new(NoSimulation::new()),
            SimulationId::GameOfLife => Box::new(game_of_life::GameOfLife::new()),
            SimulationId::MonteCarloPi => Box::new(monte_carlo_pi::MonteCarloPi::new()),
            SimulationId::Pendulum => Box::new(pendulum::Pendulum::new()),
            SimulationId::Ising => Box::new(ising::IsingModel::new()),
        }
    }
}

/// The registered simulations, in listing order
pub static DESCRIPTORS: [SimulationDescriptor; SimulationId::COUNT] = [
    SimulationDescriptor {
        id: SimulationId::None,
        name: "None",
        kind: SimulationKind::Placeholder,
        params: &[],
    },
    SimulationDescriptor {
        id: SimulationId::GameOfLife,
        name: "Game of Life",
        kind: SimulationKind::Cpu,
        params: &game_of_life::PARAMS,
    },
    SimulationDescriptor {
        id: SimulationId::MonteCarloPi,
        name: "Monte Carlo Pi",
        kind: SimulationKind::Cpu,
        params: &monte_carlo_pi::PARAMS,
    },
    SimulationDescriptor {
        id: SimulationId::Pendulum,
        name: "Pendulum",
        kind: SimulationKind::Gpu,
        params: &pendulum::PARAMS,
    },
    SimulationDescriptor {
        id: SimulationId::Ising,
        name: "Ising Model",
        kind: SimulationKind::Cpu,
        params: &ising::PARAMS,
    },
];

/// Read-only view over the descriptor table
#[derive(Debug, Clone, Copy)]
pub struct SimulationRegistry {
    entries: &'static [SimulationDescriptor],
}

impl SimulationRegistry {
    /// The built-in table
    pub fn builtin() -> Self {
        Self {
            entries: &DESCRIPTORS,
        }
    }

    /// Descriptor at `index`, or `InvalidId` when out of range
    pub fn get(&self, index: usize) -> Result<&'static SimulationDescriptor, SimulationError> {
        self.entries
            .get(index)
            .ok_or(SimulationError::InvalidId(index))
    }

    /// Descriptor for a typed identifier
    pub fn descriptor(&self, id: SimulationId) -> &'static SimulationDescriptor {
        &self.entries[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static SimulationDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display names in listing order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.name).collect()
    }
}

impl Default for SimulationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builds simulation instances for the host
pub trait SimulationFactory {
    fn create(&self, descriptor: &SimulationDescriptor) -> Box<dyn Simulation>;
}

/// Factory for the built-in simulations
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFactory;

impl SimulationFactory for BuiltinFactory {
    fn create(&self, descriptor: &SimulationDescriptor) -> Box<dyn Simulation> {
        descriptor.instantiate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_id() {
        let registry = SimulationRegistry::builtin();
        assert_eq!(registry.len(), SimulationId::COUNT);
        for (index, descriptor) in registry.iter().enumerate() {
            assert_eq!(descriptor.id.index(), index);
            assert_eq!(SimulationId::from_index(index), Ok(descriptor.id));
        }
    }

    #[test]
    fn test_every_valid_id_has_name_and_behaviour() {
        let registry = SimulationRegistry::builtin();
        for index in 0..SimulationId::COUNT {
            let descriptor = registry.get(index).unwrap();
            assert!(!descriptor.name.is_empty());
            if descriptor.id == SimulationId::None {
                assert_eq!(descriptor.kind, SimulationKind::Placeholder);
            } else {
                assert_ne!(descriptor.kind, SimulationKind::Placeholder);
                assert!(!descriptor.params.is_empty());
            }
            let instance = descriptor.instantiate();
            assert_eq!(instance.name(), descriptor.name);
        }
    }

    #[test]
    fn test_out_of_range_lookup() {
        let registry = SimulationRegistry::builtin();
        assert_eq!(
            registry.get(SimulationId::COUNT).unwrap_err(),
            SimulationError::InvalidId(SimulationId::COUNT)
        );
        assert!(SimulationId::from_index(99).is_err());
    }

    #[test]
    fn test_listing_order() {
        let names = SimulationRegistry::builtin().names();
        assert_eq!(
            names,
            vec!["None", "Game of Life", "Monte Carlo Pi", "Pendulum", "Ising Model"]
        );
    }
}
