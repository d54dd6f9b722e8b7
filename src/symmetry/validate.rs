/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Validation of derived subgroup structures

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::analyzer::{SpaceGroupDetector, Tolerance};
use super::errors::Result;
use super::matcher::{MatcherConfig, StructureComparator, StructureMatcher};
use super::symmetrize::add_new_symmetrized_atom;
use crate::structure::{Structure, SymmOp};

/// Number of symmetrized test structures generated before giving up
pub const VALIDATION_SAMPLES: usize = 10;

/// Tolerances for [`validate_subgroup`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Fractional length tolerance passed to the structure matcher
    pub ltol: f64,
    /// Site tolerance passed to the structure matcher
    pub stol: f64,
    /// Angle tolerance in degrees passed to the structure matcher
    pub angle_tol: f64,
    /// Distance tolerance used to identify the space group of the test structures
    pub symprec: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ltol: 0.001,
            stol: 0.001,
            angle_tol: 1.0,
            symprec: 0.001,
        }
    }
}

impl ValidationConfig {
    /// Matcher tolerances, comparing primitive cells
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            ltol: self.ltol,
            stol: self.stol,
            angle_tol: self.angle_tol,
            primitive_cell: true,
            ..MatcherConfig::default()
        }
    }
}

/// Validate the structure and operations produced by
/// [`get_subgroup_structure`](super::get_subgroup_structure)
///
/// Checks that the original and derived structures match, and that adding a
/// symmetrized atom to the derived structure gives a structure belonging to
/// `sub_spgn`. An empty operation set always fails.
///
/// This is a statistical check: an operation set that is only
/// subtly wrong can pass.
///
/// # Returns
///
/// A description of the problem found, if any, `None` otherwise.
pub fn validate_subgroup<D: SpaceGroupDetector + Clone>(
    structure_orig: &Structure,
    structure_sub: &Structure,
    symm_ops: &[SymmOp],
    sub_spgn: u32,
    detector: &D,
    config: &ValidationConfig,
) -> Result<Option<String>> {
    let matcher = StructureMatcher::with_detector(config.matcher_config(), detector.clone());
    validate_subgroup_with(
        structure_orig,
        structure_sub,
        symm_ops,
        sub_spgn,
        detector,
        &matcher,
        config,
        &mut rand::thread_rng(),
    )
}

/// [`validate_subgroup`] with an explicit matcher and random number generator
#[allow(clippy::too_many_arguments)]
pub fn validate_subgroup_with<D, M, R>(
    structure_orig: &Structure,
    structure_sub: &Structure,
    symm_ops: &[SymmOp],
    sub_spgn: u32,
    detector: &D,
    matcher: &M,
    config: &ValidationConfig,
    rng: &mut R,
) -> Result<Option<String>>
where
    D: SpaceGroupDetector + ?Sized,
    M: StructureComparator + ?Sized,
    R: Rng + ?Sized,
{
    if !matcher.fit(structure_orig, structure_sub)? {
        return Ok(Some("structures do not fit".to_string()));
    }

    if symm_ops.is_empty() {
        return Ok(Some("no symmetry operations given".to_string()));
    }

    let tolerance = Tolerance::with_symprec(config.symprec);
    for i in 0..VALIDATION_SAMPLES {
        let s = add_new_symmetrized_atom(structure_sub, symm_ops, "C", rng);
        if s.len() == structure_sub.len() {
            return Ok(Some("symmetry operations did not generate any new atom".to_string()));
        }
        match detector.space_group_number(&s, &tolerance) {
            Ok(spgn) if spgn == sub_spgn => return Ok(None),
            Ok(spgn) => log::debug!("sample {}: space group {} instead of {}", i, spgn, sub_spgn),
            Err(e) => log::debug!("sample {}: {}", i, e),
        }
    }

    Ok(Some(format!(
        "generated structures do not belong to the spacegroup {}",
        sub_spgn
    )))
}
