/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Subgroup structure derivation

use serde::{Deserialize, Serialize};

use super::analyzer::{SpaceGroupDetector, Tolerance};
use super::errors::{Result, SymmetryError};
use super::generator::{SubgroupGenerator, SubgroupRequest};
use super::subgroups::RelationType;
use crate::structure::{Structure, SymmOp};

/// Number of tolerance values tried when looking for the primitive cell
pub const PRIMITIVE_SEARCH_STEPS: u32 = 8;

/// Parameters for [`get_subgroup_structure`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgroupParams {
    /// Target space group number, one of the maximal subgroups of the input structure
    pub spgn: Option<u32>,
    /// Index of the transformation when several lead to the same subgroup
    pub idx: Option<usize>,
    /// Amount by which the symmetry is broken, on both positions and lattice
    pub eps: f64,
    /// Relation type of the subgroup
    pub group_type: RelationType,
    /// Return the primitive cell instead of the conventional one
    pub primitive: bool,
    /// Distance tolerance used to identify the symmetry of the input structure
    pub symprec: f64,
    /// Angle tolerance in degrees used to identify the symmetry of the input structure only
    pub angle_tolerance: f64,
    /// If set, the space group detected for the input structure must match it
    pub expected_initial_spgn: Option<u32>,
}

impl Default for SubgroupParams {
    fn default() -> Self {
        Self {
            spgn: None,
            idx: None,
            eps: 1e-5,
            group_type: RelationType::Translationengleiche,
            primitive: false,
            symprec: 0.001,
            angle_tolerance: 5.0,
            expected_initial_spgn: None,
        }
    }
}

impl SubgroupParams {
    /// Parameters targeting a given subgroup, other values at their defaults
    pub fn for_subgroup(spgn: u32) -> Self {
        Self {
            spgn: Some(spgn),
            ..Self::default()
        }
    }

    fn tolerance(&self) -> Tolerance {
        Tolerance::with_symprec(self.symprec).with_angle_tolerance(self.angle_tolerance)
    }
}

/// A structure derived in a subgroup, with the operations of that subgroup
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSubgroup {
    /// Conventional or primitive structure with the subgroup symmetry
    pub structure: Structure,
    /// Symmetry operations in the fractional basis of `structure`
    pub operations: Vec<SymmOp>,
    /// Space group number of the subgroup, as requested or as chosen by the generator
    pub spacegroup: u32,
}

/// Generate a structure equivalent to `structure` but belonging to a subgroup,
/// together with the symmetry operations of that subgroup
///
/// The symmetry is broken by an amount `eps`. `eps` can be exactly 0.0 only if
/// `primitive` is false and the subgroup has a different lattice than the
/// original one; otherwise the operations returned will generate structures
/// belonging to the original group.
///
/// Generation has a random component, so a failed call may succeed when repeated.
///
/// # Returns
///
/// The conventional (or primitive) structure with the subgroup symmetry and
/// its symmetry operations in fractional coordinates.
pub fn get_subgroup_structure<D, G>(
    structure: &Structure,
    detector: &D,
    generator: &G,
    params: &SubgroupParams,
) -> Result<(Structure, Vec<SymmOp>)>
where
    D: SpaceGroupDetector + ?Sized,
    G: SubgroupGenerator + ?Sized,
{
    let derived = derive_subgroup(structure, detector, generator, params)?;
    Ok((derived.structure, derived.operations))
}

/// [`get_subgroup_structure`], also returning the number of the derived subgroup
pub fn derive_subgroup<D, G>(
    structure: &Structure,
    detector: &D,
    generator: &G,
    params: &SubgroupParams,
) -> Result<DerivedSubgroup>
where
    D: SpaceGroupDetector + ?Sized,
    G: SubgroupGenerator + ?Sized,
{
    if params.primitive && params.eps == 0.0 {
        return Err(SymmetryError::InvalidPrecondition(
            "to determine the primitive structure eps should be greater than 0".to_string(),
        ));
    }

    let initial = detector.space_group_number(structure, &params.tolerance())?;
    if let Some(expected) = params.expected_initial_spgn {
        if initial != expected {
            return Err(SymmetryError::DetectionMismatch {
                detected: initial,
                expected,
            });
        }
    }

    let request = SubgroupRequest {
        target: params.spgn,
        idx: params.idx,
        eps: params.eps,
        group_type: params.group_type,
        symprec: params.symprec,
        angle_tolerance: params.angle_tolerance,
    };
    let candidate = generator
        .generate(structure, &request)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            SymmetryError::GenerationFailed(format!(
                "no {}-subgroup structure generated from space group {}",
                params.group_type, initial
            ))
        })?;
    let spgn = params.spgn.unwrap_or(candidate.spacegroup);
    log::debug!("derived space group {} structure from space group {}", spgn, initial);

    let (structure, operations) = if params.primitive {
        primitive_subgroup_structure(&candidate.structure, detector, spgn, params.eps)?
    } else {
        // The angle tolerance only applies to the parent structure
        let dataset = detector.detect(&candidate.structure, &Tolerance::with_symprec(params.symprec))?;
        (candidate.structure, dataset.operations)
    };

    Ok(DerivedSubgroup {
        structure,
        operations,
        spacegroup: spgn,
    })
}

/// Scan tolerances `eps * 2^i / 16` for one at which the derived structure is
/// still identified as `spgn`, then reduce it to its primitive standard cell
///
/// A failed detection skips to the next tolerance. Only a primitive cell
/// identified as a different group is fatal.
fn primitive_subgroup_structure<D: SpaceGroupDetector + ?Sized>(
    structure: &Structure,
    detector: &D,
    spgn: u32,
    eps: f64,
) -> Result<(Structure, Vec<SymmOp>)> {
    for i in 1..=PRIMITIVE_SEARCH_STEPS {
        let tolerance = Tolerance::with_symprec(eps * 2f64.powi(i as i32) / 16.0);

        let dataset = match detector.detect(structure, &tolerance) {
            Ok(dataset) => dataset,
            Err(e) => {
                log::debug!("symprec {:.3e}: detection failed: {}", tolerance.symprec, e);
                continue;
            }
        };
        if dataset.number != spgn {
            log::debug!(
                "symprec {:.3e}: space group {} instead of {}",
                tolerance.symprec,
                dataset.number,
                spgn
            );
            continue;
        }

        let primitive = dataset.primitive_standard;
        let check = match detector.detect(&primitive, &tolerance) {
            Ok(check) => check,
            Err(e) => {
                log::debug!(
                    "symprec {:.3e}: detection failed on the primitive cell: {}",
                    tolerance.symprec,
                    e
                );
                continue;
            }
        };
        if check.number != spgn {
            return Err(SymmetryError::PrimitiveMismatch {
                detected: check.number,
                expected: spgn,
            });
        }
        return Ok((primitive, check.operations));
    }

    Err(SymmetryError::ExhaustedSearch(spgn))
}
