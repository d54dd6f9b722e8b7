/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structure evolution interfaces
//!
//! An [`Evolver`] turns a structure (or nothing) into new candidate
//! structures, typically by adding atoms. A [`Condition`] decides whether a
//! structure should be kept or rejected during a search.

pub mod conditions;
pub mod energy;
pub mod errors;

pub use conditions::SmallEnergyAtoms;
pub use energy::{get_energy, Constraint, EnergyCalculator, ENERGY_PROPERTY};
pub use errors::{EvolutionError, Result};

use crate::structure::Structure;

/// Generates new structures starting from an optional base structure
///
/// New atoms, if any, must be appended after the sites of the base structure
/// so that the first `structure.len()` sites are preserved.
pub trait Evolver {
    /// Produce zero or more candidate structures
    fn evolve(&mut self, structure: Option<&Structure>) -> anyhow::Result<Vec<Structure>>;
}

impl<T: Evolver + ?Sized> Evolver for &mut T {
    fn evolve(&mut self, structure: Option<&Structure>) -> anyhow::Result<Vec<Structure>> {
        (**self).evolve(structure)
    }
}

impl<T: Evolver + ?Sized> Evolver for Box<T> {
    fn evolve(&mut self, structure: Option<&Structure>) -> anyhow::Result<Vec<Structure>> {
        (**self).evolve(structure)
    }
}

/// A predicate on a structure, with a human readable explanation
pub trait Condition {
    /// Whether the condition is satisfied, and why
    ///
    /// Implementations may cache computed properties on the structure.
    fn satisfied(&self, structure: &mut Structure) -> Result<(bool, String)>;
}
