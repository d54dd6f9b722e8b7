/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Symmetry utilities
//!
//! This module wraps space group detection, maximal subgroup enumeration and
//! the derivation of structures belonging to a subgroup of the original
//! space group. A derived structure and its operations can be checked with
//! [`validate_subgroup`], which samples symmetrized test structures.
//!
//! Group theory itself is delegated: detection goes through a
//! [`SpaceGroupDetector`] (by default [`MoyoAnalyzer`]), subgroup relations
//! through a [`SubgroupTable`] and the derivation through a
//! [`SubgroupGenerator`].

mod analyzer;
mod derive;
pub mod errors;
mod generator;
mod matcher;
mod subgroups;
mod symmetrize;
mod validate;

pub use analyzer::{MoyoAnalyzer, SpaceGroupDetector, SymmetryDataset, Tolerance};
pub use derive::{derive_subgroup, get_subgroup_structure, DerivedSubgroup, SubgroupParams, PRIMITIVE_SEARCH_STEPS};
pub use errors::{Result, SymmetryError};
pub use generator::{ExternalGenerator, SubgroupCandidate, SubgroupGenerator, SubgroupRequest};
pub use matcher::{MatcherConfig, StructureComparator, StructureMatcher};
pub use subgroups::{
    check_space_group, get_subgroups, subgroup_tree, JsonSubgroupTable, RelationType, SubgroupTable,
    SubgroupTree, Subgroups,
};
pub use symmetrize::{add_new_symmetrized_atom, symmetrized_orbit, ORBIT_MERGE_DISTANCE};
pub use validate::{validate_subgroup, validate_subgroup_with, ValidationConfig, VALIDATION_SAMPLES};
