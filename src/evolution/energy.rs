/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Energy calculation interface

use serde::{Deserialize, Serialize};

use super::errors::{EvolutionError, Result};
use crate::structure::Structure;

/// Name of the cached energy-per-atom property
pub const ENERGY_PROPERTY: &str = "energy";

/// Constraints applied during the energy calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// Keep the listed sites fixed
    FixAtoms(Vec<usize>),
    /// Keep the lattice fixed
    FixCell,
}

/// Computes the energy per atom of a structure
///
/// The calculator carries its own configuration (potential, relaxation
/// settings, ...).
pub trait EnergyCalculator {
    /// Energy per atom of `structure` under `constraints`
    fn energy(&self, structure: &Structure, constraints: &[Constraint]) -> anyhow::Result<f64>;
}

impl<T: EnergyCalculator + ?Sized> EnergyCalculator for &T {
    fn energy(&self, structure: &Structure, constraints: &[Constraint]) -> anyhow::Result<f64> {
        (**self).energy(structure, constraints)
    }
}

impl<T: EnergyCalculator + ?Sized> EnergyCalculator for Box<T> {
    fn energy(&self, structure: &Structure, constraints: &[Constraint]) -> anyhow::Result<f64> {
        (**self).energy(structure, constraints)
    }
}

/// Compute the energy per atom of `structure`
///
/// If `set_in_structure` is true the value is cached on the structure under
/// [`ENERGY_PROPERTY`].
pub fn get_energy<C: EnergyCalculator + ?Sized>(
    structure: &mut Structure,
    calculator: &C,
    constraints: &[Constraint],
    set_in_structure: bool,
) -> Result<f64> {
    let energy = calculator
        .energy(structure, constraints)
        .map_err(EvolutionError::EnergyCalculation)?;
    if set_in_structure {
        structure.set_property(ENERGY_PROPERTY, energy);
    }
    Ok(energy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Lattice;

    struct Constant(f64);

    impl EnergyCalculator for Constant {
        fn energy(&self, _structure: &Structure, _constraints: &[Constraint]) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_get_energy_caches() {
        let mut s = Structure::from_species(Lattice::cubic(3.0).unwrap(), &["C"], &[[0.0; 3]]);
        let e = get_energy(&mut s, &Constant(-7.5), &[], false).unwrap();
        assert_eq!(e, -7.5);
        assert_eq!(s.get_property(ENERGY_PROPERTY), None);

        get_energy(&mut s, &Constant(-7.5), &[Constraint::FixCell], true).unwrap();
        assert_eq!(s.get_property(ENERGY_PROPERTY), Some(-7.5));
    }
}
