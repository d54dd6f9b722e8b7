/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structure equivalence matching
//!
//! [`StructureMatcher`] compares two structures after reducing both to their
//! primitive standard cells. The standardization removes the freedom in the
//! choice of cell, so the remaining comparison only has to consider the
//! origin shift.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::analyzer::{MoyoAnalyzer, SpaceGroupDetector, Tolerance};
use super::errors::Result;
use crate::structure::Structure;

/// Tolerances of a [`StructureMatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Fractional length tolerance on the lattice parameters
    pub ltol: f64,
    /// Site tolerance, in units of `(V / n)^(1/3)`
    pub stol: f64,
    /// Angle tolerance in degrees
    pub angle_tol: f64,
    /// Compare the primitive standard cells instead of the input cells
    pub primitive_cell: bool,
    /// Distance tolerance in Å used to find the primitive standard cells
    pub reduction_symprec: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ltol: 0.2,
            stol: 0.3,
            angle_tol: 5.0,
            primitive_cell: true,
            reduction_symprec: 0.1,
        }
    }
}

/// Boolean equivalence test between two structures
pub trait StructureComparator {
    /// Whether `a` and `b` describe the same structure within tolerances
    fn fit(&self, a: &Structure, b: &Structure) -> Result<bool>;
}

/// Structure matcher working on standardized cells
#[derive(Debug, Clone)]
pub struct StructureMatcher<D = MoyoAnalyzer> {
    config: MatcherConfig,
    detector: D,
}

impl StructureMatcher<MoyoAnalyzer> {
    /// Create a matcher with the given tolerances
    pub fn new(config: MatcherConfig) -> Self {
        Self::with_detector(config, MoyoAnalyzer::new())
    }
}

impl<D: SpaceGroupDetector> StructureMatcher<D> {
    /// Create a matcher using a specific detector to standardize the cells
    pub fn with_detector(config: MatcherConfig, detector: D) -> Self {
        Self { config, detector }
    }

    /// Get the matcher tolerances
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    fn reduce(&self, structure: &Structure) -> Structure {
        if !self.config.primitive_cell {
            return structure.clone();
        }
        let tolerance = Tolerance::with_symprec(self.config.reduction_symprec);
        match self.detector.detect(structure, &tolerance) {
            Ok(dataset) => dataset.primitive_standard,
            Err(e) => {
                log::debug!("keeping input cell, standardization failed: {}", e);
                structure.clone()
            }
        }
    }

    fn lattices_match(&self, a: &Structure, b: &Structure) -> bool {
        let (la, lb) = (a.lattice(), b.lattice());
        let lengths = la
            .abc()
            .iter()
            .zip(lb.abc())
            .all(|(x, y)| ((x - y) / x).abs() <= self.config.ltol);
        let angles = la
            .angles()
            .iter()
            .zip(lb.angles())
            .all(|(x, y)| (x - y).abs() <= self.config.angle_tol);
        lengths && angles
    }

    fn sites_match(&self, a: &Structure, b: &Structure) -> bool {
        let Some(anchor) = a.sites().first() else {
            return true;
        };
        let lattice = a.lattice();
        let cutoff = self.config.stol * (lattice.volume() / a.len() as f64).cbrt();

        b.sites()
            .iter()
            .filter(|site| site.species == anchor.species)
            .any(|origin| {
                let shift = [
                    anchor.frac_coords[0] - origin.frac_coords[0],
                    anchor.frac_coords[1] - origin.frac_coords[1],
                    anchor.frac_coords[2] - origin.frac_coords[2],
                ];
                let moved: Vec<[f64; 3]> = b
                    .sites()
                    .iter()
                    .map(|s| {
                        let f = s.frac_coords;
                        [f[0] + shift[0], f[1] + shift[1], f[2] + shift[2]]
                    })
                    .collect();
                pair_sites(a, b, &moved, cutoff)
            })
    }
}

/// Pair every site of `a` with a distinct site of `b` of the same species,
/// taking the nearest unused one within `cutoff`
fn pair_sites(a: &Structure, b: &Structure, b_coords: &[[f64; 3]], cutoff: f64) -> bool {
    let lattice = a.lattice();
    let mut used = vec![false; b.len()];

    for site in a.sites() {
        let nearest = b
            .sites()
            .iter()
            .zip(b_coords)
            .enumerate()
            .filter(|(j, (other, _))| !used[*j] && other.species == site.species)
            .map(|(j, (_, coords))| (j, lattice.distance(&site.frac_coords, coords)))
            .filter(|&(_, d)| d <= cutoff)
            .min_by(|x, y| x.1.total_cmp(&y.1));

        match nearest {
            Some((j, _)) => used[j] = true,
            None => return false,
        }
    }
    true
}

impl<D: SpaceGroupDetector> StructureComparator for StructureMatcher<D> {
    fn fit(&self, a: &Structure, b: &Structure) -> Result<bool> {
        let (a, b) = (self.reduce(a), self.reduce(b));

        if a.len() != b.len() || composition(&a) != composition(&b) {
            return Ok(false);
        }

        Ok(self.lattices_match(&a, &b) && self.sites_match(&a, &b))
    }
}

fn composition(structure: &Structure) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for species in structure.species() {
        *counts.entry(species).or_insert(0) += 1;
    }
    counts
}
