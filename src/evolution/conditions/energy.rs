/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Conditions on the energy of a structure

use std::collections::BTreeMap;

use crate::evolution::energy::{get_energy, Constraint, EnergyCalculator, ENERGY_PROPERTY};
use crate::evolution::errors::Result;
use crate::evolution::Condition;
use crate::structure::Structure;

/// Condition on the combination of energy per atom and number of atoms
///
/// Given a map from number of atoms to energy per atom, the condition is
/// satisfied if, for at least one entry, the structure has more atoms than the
/// key and an energy higher than the value.
///
/// With `criteria = {100: -1.5, 200: -2.0}`:
/// * 140 atoms and an energy of -1.3 is satisfied.
/// * 50 atoms and an energy of -0.1 is not.
/// * 150 atoms and an energy of -1.8 is not.
pub struct SmallEnergyAtoms<C> {
    criteria: BTreeMap<usize, f64>,
    calculator: C,
    constraints: Vec<Constraint>,
}

impl<C: EnergyCalculator> SmallEnergyAtoms<C> {
    /// Create a new condition
    pub fn new(criteria: BTreeMap<usize, f64>, calculator: C) -> Self {
        Self {
            criteria,
            calculator,
            constraints: Vec::new(),
        }
    }

    /// Constraints used when the energy has to be computed
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// The thresholds, number of atoms to energy per atom
    pub fn criteria(&self) -> &BTreeMap<usize, f64> {
        &self.criteria
    }
}

impl<C: EnergyCalculator> Condition for SmallEnergyAtoms<C> {
    fn satisfied(&self, structure: &mut Structure) -> Result<(bool, String)> {
        let energy = match structure.get_property(ENERGY_PROPERTY) {
            Some(e) => e,
            None => get_energy(structure, &self.calculator, &self.constraints, true)?,
        };
        let nsites = structure.len();

        for (&n_threshold, &e_threshold) in &self.criteria {
            if nsites > n_threshold && energy > e_threshold {
                return Ok((
                    true,
                    format!("SmallEnergyAtoms. nsites: {}, energy: {}", nsites, energy),
                ));
            }
        }

        Ok((false, "SmallEnergyAtoms. no condition satisfied".to_string()))
    }
}
