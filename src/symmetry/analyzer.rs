/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Space group detection
//!
//! [`SpaceGroupDetector`] is the seam through which every procedure in this
//! crate asks for the symmetry of a structure. [`MoyoAnalyzer`] implements it
//! on top of the `moyo` symmetry finder.

use moyo::base::{AngleTolerance, Cell, Lattice as MoyoLattice};
use moyo::data::Setting;
use moyo::MoyoDataset;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::errors::{Result, SymmetryError};
use crate::structure::{Lattice, Site, Structure, SymmOp};

/// Tolerances used to detect the symmetry of a structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Distance tolerance in Å
    pub symprec: f64,
    /// Angle tolerance in degrees. If None the detector derives the angle
    /// criterion from `symprec`, so that small lattice distortions are resolved.
    pub angle_tolerance: Option<f64>,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            symprec: 0.01,
            angle_tolerance: None,
        }
    }
}

impl Tolerance {
    /// Create a tolerance without an explicit angle tolerance
    pub fn with_symprec(symprec: f64) -> Self {
        Self {
            symprec,
            ..Self::default()
        }
    }

    /// Set an explicit angle tolerance in degrees
    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        self.angle_tolerance = Some(degrees);
        self
    }
}

/// Result of a space group detection
#[derive(Debug, Clone)]
pub struct SymmetryDataset {
    /// International space group number (1-230)
    pub number: u32,
    /// Symmetry operations in the basis of the analysed structure
    pub operations: Vec<SymmOp>,
    /// Primitive standardized structure
    pub primitive_standard: Structure,
}

/// Detects space groups, symmetry operations and primitive standard cells
pub trait SpaceGroupDetector {
    /// Analyse the symmetry of `structure` at the given tolerances
    fn detect(&self, structure: &Structure, tolerance: &Tolerance) -> Result<SymmetryDataset>;

    /// Space group number of `structure`
    fn space_group_number(&self, structure: &Structure, tolerance: &Tolerance) -> Result<u32> {
        Ok(self.detect(structure, tolerance)?.number)
    }
}

impl<T: SpaceGroupDetector + ?Sized> SpaceGroupDetector for &T {
    fn detect(&self, structure: &Structure, tolerance: &Tolerance) -> Result<SymmetryDataset> {
        (**self).detect(structure, tolerance)
    }
}

/// Space group detection backed by `moyo`
#[derive(Debug, Clone, Copy, Default)]
pub struct MoyoAnalyzer;

impl MoyoAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self
    }
}

impl SpaceGroupDetector for MoyoAnalyzer {
    fn detect(&self, structure: &Structure, tolerance: &Tolerance) -> Result<SymmetryDataset> {
        let (cell, labels) = to_moyo_cell(structure);

        let angle_tolerance = match tolerance.angle_tolerance {
            Some(degrees) => AngleTolerance::Radian(degrees.to_radians()),
            None => AngleTolerance::Default,
        };
        let dataset = MoyoDataset::new(&cell, tolerance.symprec, angle_tolerance, Setting::Spglib, true)
        .map_err(|e| SymmetryError::DetectionFailed(format!("{:?}", e)))?;

        let number = u32::try_from(dataset.number)
            .map_err(|_| SymmetryError::DetectionFailed(format!("space group {}", dataset.number)))?;

        let operations = dataset
            .operations
            .iter()
            .map(|op| SymmOp::from_matrices(&op.rotation, &op.translation))
            .collect();

        let primitive_standard = from_moyo_cell(&dataset.prim_std_cell, &labels)?;

        Ok(SymmetryDataset {
            number,
            operations,
            primitive_standard,
        })
    }
}

/// Convert a structure to a moyo cell, returning the species label of each type id
fn to_moyo_cell(structure: &Structure) -> (Cell, Vec<String>) {
    let mut labels: Vec<String> = Vec::new();
    let mut numbers = Vec::with_capacity(structure.len());
    let mut positions = Vec::with_capacity(structure.len());

    for site in structure.sites() {
        let id = match labels.iter().position(|l| *l == site.species) {
            Some(id) => id,
            None => {
                labels.push(site.species.clone());
                labels.len() - 1
            }
        };
        numbers.push(id as i32 + 1);
        let f = site.frac_coords;
        positions.push(Vector3::new(f[0], f[1], f[2]));
    }

    let lattice = MoyoLattice::new(structure.lattice().matrix());
    (Cell::new(lattice, positions, numbers), labels)
}

fn from_moyo_cell(cell: &Cell, labels: &[String]) -> Result<Structure> {
    // moyo stores basis vectors as columns
    let basis = cell.lattice.basis.transpose();
    let lattice = Lattice::new([
        [basis[(0, 0)], basis[(0, 1)], basis[(0, 2)]],
        [basis[(1, 0)], basis[(1, 1)], basis[(1, 2)]],
        [basis[(2, 0)], basis[(2, 1)], basis[(2, 2)]],
    ])?;

    let sites = cell
        .positions
        .iter()
        .zip(&cell.numbers)
        .map(|(p, &n)| {
            let species = labels
                .get((n - 1) as usize)
                .map(String::as_str)
                .unwrap_or("X");
            Site::new(species, [p.x, p.y, p.z])
        })
        .collect();

    Ok(Structure::new(lattice, sites))
}
